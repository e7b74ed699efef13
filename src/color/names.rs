use super::convert::rgb_distance;
use crate::features::Rgb;

/// 颜色名称参考表，顺序即查找顺序：距离相同时取靠前的条目
pub static COLOR_NAMES: &[(Rgb, &str)] = &[
    (Rgb::new(0xFF, 0x00, 0x00), "red"),
    (Rgb::new(0xFF, 0x44, 0x44), "red"),
    (Rgb::new(0xCC, 0x00, 0x00), "dark red"),
    (Rgb::new(0xFF, 0xA5, 0x00), "orange"),
    (Rgb::new(0xFF, 0x8C, 0x00), "dark orange"),
    (Rgb::new(0xFF, 0xB3, 0x47), "light orange"),
    (Rgb::new(0xFF, 0xFF, 0x00), "yellow"),
    (Rgb::new(0xFF, 0xD7, 0x00), "gold"),
    (Rgb::new(0xFF, 0xFF, 0xE0), "light yellow"),
    (Rgb::new(0x00, 0xFF, 0x00), "green"),
    (Rgb::new(0x00, 0x80, 0x00), "dark green"),
    (Rgb::new(0x90, 0xEE, 0x90), "light green"),
    (Rgb::new(0x00, 0xFF, 0xFF), "cyan"),
    (Rgb::new(0x00, 0x8B, 0x8B), "dark cyan"),
    (Rgb::new(0xE0, 0xFF, 0xFF), "light cyan"),
    (Rgb::new(0x00, 0x00, 0xFF), "blue"),
    (Rgb::new(0x00, 0x00, 0x80), "navy"),
    (Rgb::new(0x87, 0xCE, 0xEB), "sky blue"),
    (Rgb::new(0x80, 0x00, 0x80), "purple"),
    (Rgb::new(0x4B, 0x00, 0x82), "indigo"),
    (Rgb::new(0xDA, 0x70, 0xD6), "orchid"),
    (Rgb::new(0xFF, 0xC0, 0xCB), "pink"),
    (Rgb::new(0xFF, 0x14, 0x93), "deep pink"),
    (Rgb::new(0xFF, 0xB6, 0xC1), "light pink"),
    (Rgb::new(0xA5, 0x2A, 0x2A), "brown"),
    (Rgb::new(0x8B, 0x45, 0x13), "saddle brown"),
    (Rgb::new(0xD2, 0x69, 0x1E), "chocolate"),
    (Rgb::new(0x00, 0x00, 0x00), "black"),
    (Rgb::new(0xFF, 0xFF, 0xFF), "white"),
    (Rgb::new(0x80, 0x80, 0x80), "gray"),
    (Rgb::new(0xC0, 0xC0, 0xC0), "silver"),
    (Rgb::new(0xF5, 0xF5, 0xDC), "beige"),
];

/// 在参考表中查找最接近的颜色名称
pub fn closest_color_name(rgb: Rgb) -> &'static str {
    let mut closest = "unknown";
    let mut min_distance = f64::INFINITY;
    for (reference, name) in COLOR_NAMES {
        let distance = rgb_distance(rgb, *reference);
        if distance < min_distance {
            min_distance = distance;
            closest = name;
        }
    }
    closest
}
