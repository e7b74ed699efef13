//! 颜色分析：主导颜色、颜色名称、亮度、对比度、色彩和谐度、冷暖
//!
//! 图片先等比裁剪到一个很小的固定尺寸，之后的所有统计都基于这个网格，
//! 保证不同分辨率的图片之间可以直接比较。

pub mod convert;
pub mod names;

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::config::AnalyzeOptions;
use crate::features::{
    ColorFeatures, ColorHarmony, DominantColor, Hsl, NamedColor, Rgb, Temperature,
};
use crate::grid::{PixelGrid, SourceImage, stddev_from_sums};
use crate::rules::classify_harmony;
use convert::*;
use names::closest_color_name;

/// 量化步长，每个通道被量化为 16 个等级
const QUANT_STEP: f64 = 17.0;

/// 无法计算亮度/对比度时的中性值
const NEUTRAL: u8 = 50;

pub fn analyze_colors(image: &SourceImage, options: &AnalyzeOptions) -> ColorFeatures {
    let grid = image.rgba_grid(options.resize_width, options.resize_height);
    analyze_grid(&grid, options.num_colors)
}

pub fn analyze_grid(grid: &PixelGrid, num_colors: usize) -> ColorFeatures {
    let dominant_colors = quantize_colors(grid, num_colors);
    let (brightness, contrast) = luma_stats(grid);
    let color_palette =
        dominant_colors.iter().map(|c| closest_color_name(c.rgb).to_string()).collect();
    let color_harmony = detect_harmony(&dominant_colors);
    let is_grayscale = dominant_colors.iter().all(|c| channel_spread(c.rgb) < 20);
    let temperature = detect_temperature(&dominant_colors);

    let primary_color = dominant_colors.first().map(named).unwrap_or_else(placeholder);
    let secondary_color = dominant_colors.get(1).map(named).unwrap_or_else(|| primary_color.clone());

    debug!(
        "colors: {} dominant, brightness {}, contrast {}, {:?}, {:?}",
        dominant_colors.len(),
        brightness,
        contrast,
        color_harmony,
        temperature
    );

    ColorFeatures {
        dominant_colors,
        color_palette,
        primary_color,
        secondary_color,
        brightness,
        contrast,
        color_harmony,
        is_grayscale,
        temperature,
    }
}

fn quantize(v: u8) -> u8 {
    ((v as f64 / QUANT_STEP).round() * QUANT_STEP) as u8
}

/// 量化后统计颜色频率，返回出现次数最多的 `num_colors` 个颜色
///
/// 次数相同的颜色按照首次出现的顺序排列，保证结果稳定
pub fn quantize_colors(grid: &PixelGrid, num_colors: usize) -> Vec<DominantColor> {
    let mut counter: HashMap<[u8; 3], (u32, usize)> = HashMap::new();
    let mut total = 0u32;
    for [r, g, b] in grid.opaque() {
        let key = [quantize(r), quantize(g), quantize(b)];
        let seen = counter.len();
        counter.entry(key).or_insert((0, seen)).0 += 1;
        total += 1;
    }

    let mut colors = counter.into_iter().collect::<Vec<_>>();
    colors.sort_unstable_by(|(_, (ca, oa)), (_, (cb, ob))| cb.cmp(ca).then(oa.cmp(ob)));
    colors.truncate(num_colors);

    let mut dominant = colors
        .into_iter()
        .map(|([r, g, b], (count, _))| {
            let rgb = Rgb::new(r, g, b);
            DominantColor {
                hex: rgb_to_hex(rgb),
                rgb,
                percentage: (count as f64 / total as f64 * 100.0).round() as u8,
                count,
            }
        })
        .collect::<Vec<_>>();

    // 四舍五入可能让总和超过 100，从占比最小的颜色开始扣除
    let mut sum: u32 = dominant.iter().map(|c| c.percentage as u32).sum();
    for color in dominant.iter_mut().rev() {
        while sum > 100 && color.percentage > 0 {
            color.percentage -= 1;
            sum -= 1;
        }
    }

    dominant
}

/// 返回 (亮度, 对比度)，都在 0 ~ 100 之间
///
/// 亮度为 ITU-R 601 亮度的均值，对比度为其标准差 / 128
pub fn luma_stats(grid: &PixelGrid) -> (u8, u8) {
    // 亮度放大 1000 倍后用整数累加，结果与像素顺序无关
    let mut n = 0u64;
    let mut sum = 0u128;
    let mut sum_sq = 0u128;
    for [r, g, b] in grid.opaque() {
        let luma = r as u128 * 299 + g as u128 * 587 + b as u128 * 114;
        n += 1;
        sum += luma;
        sum_sq += luma * luma;
    }
    if n == 0 {
        return (NEUTRAL, NEUTRAL);
    }

    let mean = sum as f64 / n as f64 / 1000.0;
    let stddev = stddev_from_sums(n, sum, sum_sq) / 1000.0;

    let brightness = (mean / 255.0 * 100.0).round() as u8;
    let contrast = (stddev / 128.0 * 100.0).round().min(100.0) as u8;
    (brightness, contrast)
}

fn detect_harmony(colors: &[DominantColor]) -> ColorHarmony {
    if colors.len() < 2 {
        return ColorHarmony::Monochromatic;
    }
    let hues = colors.iter().map(|c| rgb_to_hsl(c.rgb).h).collect::<Vec<_>>();
    let diffs = hues.windows(2).map(|w| w[0].abs_diff(w[1]) as f64).collect::<Vec<_>>();
    classify_harmony(diffs.iter().sum::<f64>() / diffs.len() as f64)
}

fn detect_temperature(colors: &[DominantColor]) -> Temperature {
    let mut warm = 0u32;
    let mut cool = 0u32;
    for color in colors {
        let hue = rgb_to_hsl(color.rgb).h;
        if hue <= 60 || (300..=360).contains(&hue) {
            warm += color.percentage as u32;
        } else if (180..=270).contains(&hue) {
            cool += color.percentage as u32;
        }
    }

    let (warm, cool) = (warm as f64, cool as f64);
    if warm > cool * 1.5 {
        Temperature::Warm
    } else if cool > warm * 1.5 {
        Temperature::Cool
    } else {
        Temperature::Neutral
    }
}

fn named(color: &DominantColor) -> NamedColor {
    NamedColor {
        color: color.clone(),
        name: closest_color_name(color.rgb).to_string(),
        hsl: rgb_to_hsl(color.rgb),
    }
}

/// 图片完全透明时使用的中性灰
fn placeholder() -> NamedColor {
    let rgb = Rgb::new(128, 128, 128);
    NamedColor {
        color: DominantColor { hex: rgb_to_hex(rgb), rgb, percentage: 0, count: 0 },
        name: "unknown".to_string(),
        hsl: Hsl { h: 0, s: 0, l: 50 },
    }
}

/// 按主导颜色的占比加权的颜色相似度，范围 0 ~ 100
///
/// 每个颜色取另一方中最接近的颜色，权重为两者占比的较小值。
/// 相同的颜色集合得到 100；任意一方为空时返回 None
pub fn compare_dominant_colors(a: &[DominantColor], b: &[DominantColor]) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let similarity = |ca: &DominantColor, cb: &DominantColor| {
        let distance = hex_distance(&ca.hex, &cb.hex).unwrap_or_else(|| rgb_distance(ca.rgb, cb.rgb));
        (100.0 - distance / MAX_RGB_DISTANCE * 100.0).max(0.0)
    };

    let mut total = 0.0;
    let mut weight = 0.0;
    let mut plain = 0.0;
    for ca in a {
        let mut best: Option<(f64, &DominantColor)> = None;
        for cb in b {
            let s = similarity(ca, cb);
            if best.is_none_or(|(top, _)| s > top) {
                best = Some((s, cb));
            }
        }
        if let Some((s, cb)) = best {
            let w = ca.percentage.min(cb.percentage) as f64;
            total += s * w;
            weight += w;
            plain += s;
        }
    }
    // 旧记录可能没有占比，此时退化为简单平均
    let score = if weight > 0.0 { total / weight } else { plain / a.len() as f64 };
    Some(score.round())
}

/// 调色板中的一项，带有更亮和更暗的变体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteSwatch {
    pub original: String,
    pub lighter: String,
    pub darker: String,
    pub name: &'static str,
    pub percentage: u8,
}

impl ColorFeatures {
    /// 生成用于展示的调色板
    pub fn palette_swatches(&self) -> Vec<PaletteSwatch> {
        self.dominant_colors
            .iter()
            .map(|c| PaletteSwatch {
                original: c.hex.clone(),
                lighter: rgb_to_hex(lighten(c.rgb, 40)),
                darker: rgb_to_hex(darken(c.rgb, 40)),
                name: closest_color_name(c.rgb),
                percentage: c.percentage,
            })
            .collect()
    }
}
