//! 两份视觉记录之间的相似度
//!
//! 查询图片和候选商品都以 [`VisualProfile`] 表示，任何字段都可能缺失。
//! 缺失的字段只会让对应的分数退化为中性值 50，不会报错。

mod weights;

pub use weights::{Category, Factor, Weights};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::compare_dominant_colors;
use crate::color::convert::hue_distance;
use crate::features::{Pattern, Style, Temperature, Texture, VisualProfile};

/// 数据缺失时的中性分数
pub const NEUTRAL_SCORE: f64 = 50.0;

/// 纹理分组，同组的纹理视为相近
static TEXTURE_GROUPS: &[&[Texture]] = &[
    &[Texture::Smooth, Texture::Matte, Texture::Glossy],
    &[Texture::Rough, Texture::Textured],
    &[Texture::Fabric],
    &[Texture::Leather, Texture::Metal, Texture::Wood, Texture::Plastic],
];

static STYLE_GROUPS: &[&[Style]] = &[
    &[Style::Modern, Style::Contemporary, Style::Minimalist],
    &[Style::Classic, Style::Vintage, Style::Rustic],
    &[Style::Bohemian, Style::Industrial, Style::Abstract],
];

/// 每个因子的得分，0 ~ 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub color: u8,
    pub pattern: u8,
    pub brightness: u8,
    pub contrast: u8,
    pub texture: u8,
    pub style: u8,
}

impl FactorScores {
    pub fn get(&self, factor: Factor) -> u8 {
        match factor {
            Factor::Color => self.color,
            Factor::Pattern => self.pattern,
            Factor::Brightness => self.brightness,
            Factor::Contrast => self.contrast,
            Factor::Texture => self.texture,
            Factor::Style => self.style,
        }
    }
}

/// 单个候选商品的评分结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Similarity {
    pub overall_score: u8,
    pub breakdown: FactorScores,
    pub weights: Weights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "very high")]
    VeryHigh,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::VeryHigh => "very high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub score: u8,
}

/// 按类别权重计算相似度
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEngine {
    weights: Weights,
}

impl SimilarityEngine {
    pub fn new(category: Category) -> Self {
        Self { weights: *category.weights() }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// 比较查询记录与候选记录
    ///
    /// 所有因子都会计算并出现在 `breakdown` 中，但总分只累加权重大于 0 的因子
    pub fn compare(&self, query: &VisualProfile, candidate: &VisualProfile) -> Similarity {
        let raw = [
            (Factor::Color, color_similarity(query, candidate)),
            (Factor::Pattern, pattern_similarity(query, candidate)),
            (Factor::Brightness, level_similarity(query.brightness, candidate.brightness)),
            (Factor::Contrast, level_similarity(query.contrast, candidate.contrast)),
            (Factor::Texture, texture_similarity(known_texture(query), known_texture(candidate))),
            (Factor::Style, style_similarity(query.style, candidate.style)),
        ];

        let overall: f64 = raw.iter().map(|(factor, score)| score * self.weights.get(*factor)).sum();

        let round = |score: f64| score.round().clamp(0.0, 100.0) as u8;
        let mut breakdown = FactorScores::default();
        for (factor, score) in raw {
            let slot = match factor {
                Factor::Color => &mut breakdown.color,
                Factor::Pattern => &mut breakdown.pattern,
                Factor::Brightness => &mut breakdown.brightness,
                Factor::Contrast => &mut breakdown.contrast,
                Factor::Texture => &mut breakdown.texture,
                Factor::Style => &mut breakdown.style,
            };
            *slot = round(score);
        }

        Similarity { overall_score: round(overall), breakdown, weights: self.weights }
    }
}

impl Similarity {
    /// 总分与各因子一致程度的综合置信度，只统计权重大于 0 的因子
    pub fn confidence(&self) -> Confidence {
        let overall = self.overall_score as f64;
        let deviations = self
            .weights
            .active()
            .map(|f| (self.breakdown.get(f) as f64 - overall).abs())
            .collect::<Vec<_>>();
        let consistency = if deviations.is_empty() {
            100.0
        } else {
            (100.0 - deviations.iter().sum::<f64>() / deviations.len() as f64).max(0.0)
        };

        let score = overall * 0.7 + consistency * 0.3;
        let level = if score >= 85.0 {
            ConfidenceLevel::VeryHigh
        } else if score >= 70.0 {
            ConfidenceLevel::High
        } else if score >= 50.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };
        Confidence { level, score: score.round() as u8 }
    }

    /// 按得分从高到低描述匹配原因
    pub fn explanation(&self) -> Vec<String> {
        let mut factors = self.weights.active().collect::<Vec<_>>();
        factors.sort_by_key(|f| std::cmp::Reverse(self.breakdown.get(*f)));

        let mut lines = factors
            .into_iter()
            .filter_map(|factor| {
                let score = self.breakdown.get(factor);
                match score {
                    80.. => Some(format!("Excellent {} match ({}%)", factor, score)),
                    60..80 => Some(format!("Good {} similarity ({}%)", factor, score)),
                    40..60 => Some(format!("Moderate {} match ({}%)", factor, score)),
                    _ => None,
                }
            })
            .collect::<Vec<_>>();
        if lines.is_empty() {
            lines.push("Limited visual similarity detected".to_string());
        }
        lines
    }
}

/// 主导颜色 50%，调色板重合度 25%，主色色相 15%，冷暖 10%
fn color_similarity(a: &VisualProfile, b: &VisualProfile) -> f64 {
    let dominant = compare_dominant_colors(&a.dominant_colors, &b.dominant_colors).unwrap_or(NEUTRAL_SCORE);
    let palette = palette_overlap(a.color_palette.as_deref(), b.color_palette.as_deref());
    let hue = match (a.primary_hue, b.primary_hue) {
        (Some(x), Some(y)) => 100.0 - hue_distance(x, y) as f64 / 180.0 * 100.0,
        _ => NEUTRAL_SCORE,
    };
    let temperature = temperature_similarity(a.temperature, b.temperature);
    dominant * 0.5 + palette * 0.25 + hue * 0.15 + temperature * 0.1
}

/// 查询调色板中出现在候选调色板里的比例
fn palette_overlap(a: Option<&[String]>, b: Option<&[String]>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            let common = a.iter().filter(|name| b.contains(name)).count();
            common as f64 / a.len() as f64 * 100.0
        }
        _ => NEUTRAL_SCORE,
    }
}

fn temperature_similarity(a: Option<Temperature>, b: Option<Temperature>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 100.0,
        (Some(Temperature::Neutral), Some(_)) | (Some(_), Some(Temperature::Neutral)) => 50.0,
        (Some(_), Some(_)) => 0.0,
        _ => NEUTRAL_SCORE,
    }
}

fn known_pattern(p: &VisualProfile) -> Option<Pattern> {
    p.pattern.filter(|p| *p != Pattern::Unknown)
}

fn known_texture(p: &VisualProfile) -> Option<Texture> {
    p.texture.filter(|t| *t != Texture::Unknown)
}

/// 图案 40 分，纹理 30 分，复杂度 20 分，对称度 10 分
///
/// 单项缺失时给该项一半的分数，图案和纹理都缺失时直接返回中性分数
pub fn pattern_similarity(a: &VisualProfile, b: &VisualProfile) -> f64 {
    let (pa, pb) = (known_pattern(a), known_pattern(b));
    let (ta, tb) = (known_texture(a), known_texture(b));
    if (pa.is_none() || pb.is_none()) && (ta.is_none() || tb.is_none()) {
        return NEUTRAL_SCORE;
    }

    let pattern = match (pa, pb) {
        (Some(x), Some(y)) if x == y => 40.0,
        (Some(Pattern::Solid), Some(Pattern::Plain)) | (Some(Pattern::Plain), Some(Pattern::Solid)) => 30.0,
        (Some(Pattern::Striped), Some(Pattern::Geometric))
        | (Some(Pattern::Geometric), Some(Pattern::Striped)) => 25.0,
        (Some(_), Some(_)) => 0.0,
        _ => 20.0,
    };
    let texture = match (ta, tb) {
        (Some(x), Some(y)) if x == y => 30.0,
        (Some(Texture::Smooth), Some(Texture::Matte)) | (Some(Texture::Matte), Some(Texture::Smooth)) => 20.0,
        (Some(_), Some(_)) => 0.0,
        _ => 15.0,
    };
    let complexity = match (a.complexity, b.complexity) {
        (Some(x), Some(y)) => (20.0 - x.abs_diff(y) as f64 / 5.0).max(0.0),
        _ => 10.0,
    };
    let symmetry = match (a.symmetry, b.symmetry) {
        (Some(x), Some(y)) => (10.0 - x.abs_diff(y) as f64 / 10.0).max(0.0),
        _ => 5.0,
    };
    pattern + texture + complexity + symmetry
}

fn level_similarity(a: Option<u8>, b: Option<u8>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => (100.0 - a.abs_diff(b) as f64).max(0.0),
        _ => NEUTRAL_SCORE,
    }
}

fn texture_similarity(a: Option<Texture>, b: Option<Texture>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 100.0,
        (Some(a), Some(b)) if TEXTURE_GROUPS.iter().any(|g| g.contains(&a) && g.contains(&b)) => 70.0,
        (Some(_), Some(_)) => 30.0,
        _ => NEUTRAL_SCORE,
    }
}

fn style_similarity(a: Option<Style>, b: Option<Style>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 100.0,
        (Some(a), Some(b)) if STYLE_GROUPS.iter().any(|g| g.contains(&a) && g.contains(&b)) => 75.0,
        (Some(_), Some(_)) => 25.0,
        _ => NEUTRAL_SCORE,
    }
}
