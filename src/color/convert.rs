use crate::features::{Hsl, Rgb};

/// RGB 空间中两个颜色的最大欧氏距离
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// 转换为 `#RRGGBB`（大写）
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

/// 解析 `#RRGGBB` 或 `RRGGBB`，大小写不敏感
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if max == min {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s)
    };

    // 四舍五入后可能得到 360，折回 0
    Hsl { h: (h * 360.0).round() as u16 % 360, s: (s * 100.0).round() as u8, l: (l * 100.0).round() as u8 }
}

/// 两个颜色的欧氏距离
pub fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// 两个十六进制颜色的距离，任意一个无法解析时返回 None
pub fn hex_distance(a: &str, b: &str) -> Option<f64> {
    Some(rgb_distance(hex_to_rgb(a)?, hex_to_rgb(b)?))
}

/// 色环上的最短角距离，范围 0 ~ 180
pub fn hue_distance(a: u16, b: u16) -> u16 {
    let d = (a % 360).abs_diff(b % 360);
    d.min(360 - d)
}

/// 通道之间的最大差值，用于判断是否为灰色
pub fn channel_spread(rgb: Rgb) -> u8 {
    rgb.r.abs_diff(rgb.g).max(rgb.g.abs_diff(rgb.b)).max(rgb.b.abs_diff(rgb.r))
}

pub fn lighten(rgb: Rgb, amount: u8) -> Rgb {
    Rgb::new(rgb.r.saturating_add(amount), rgb.g.saturating_add(amount), rgb.b.saturating_add(amount))
}

pub fn darken(rgb: Rgb, amount: u8) -> Rgb {
    Rgb::new(rgb.r.saturating_sub(amount), rgb.g.saturating_sub(amount), rgb.b.saturating_sub(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(rgb_to_hex(Rgb::new(102, 126, 234)), "#667EEA");
        assert_eq!(hex_to_rgb("#667eea"), Some(Rgb::new(102, 126, 234)));
        assert_eq!(hex_to_rgb("667EEA"), Some(Rgb::new(102, 126, 234)));
        assert_eq!(hex_to_rgb("#66"), None);
        assert_eq!(hex_to_rgb("#zz7eea"), None);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(rgb_to_hsl(Rgb::new(255, 0, 0)), Hsl { h: 0, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(Rgb::new(0, 255, 0)), Hsl { h: 120, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(Rgb::new(0, 0, 255)), Hsl { h: 240, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(Rgb::new(128, 128, 128)), Hsl { h: 0, s: 0, l: 50 });
    }

    #[test]
    fn test_hsl_purple() {
        // #667EEA 偏蓝的紫色
        let hsl = rgb_to_hsl(Rgb::new(102, 126, 234));
        assert_eq!(hsl.h, 229);
    }

    #[test]
    fn test_max_distance() {
        let d = rgb_distance(Rgb::new(0, 0, 0), Rgb::new(255, 255, 255));
        assert!((d - MAX_RGB_DISTANCE).abs() < 1e-9);
    }

    #[test]
    fn test_hue_distance_wraps() {
        assert_eq!(hue_distance(350, 10), 20);
        assert_eq!(hue_distance(0, 180), 180);
        assert_eq!(hue_distance(360, 0), 0);
    }

    #[test]
    fn test_lighten_darken_clamp() {
        assert_eq!(lighten(Rgb::new(230, 10, 0), 40), Rgb::new(255, 50, 40));
        assert_eq!(darken(Rgb::new(230, 10, 0), 40), Rgb::new(190, 0, 0));
    }
}
