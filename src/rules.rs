//! 各分类器使用的阈值规则表
//!
//! 每张表都是按顺序排列的 `(条件, 结果)`，从上到下第一个满足条件的规则生效。

use crate::features::{
    ColorHarmony, ComplexityLevel, Orientation, Pattern, PatternFeatures, ShapeDistribution,
    Style, Texture,
};

pub struct Rule<S: ?Sized, T> {
    pub when: fn(&S) -> bool,
    pub then: T,
}

/// 返回第一个满足条件的规则结果，全部不满足时返回 `default`
pub fn first_match<S: ?Sized, T: Copy>(rules: &[Rule<S, T>], signal: &S, default: T) -> T {
    rules.iter().find(|rule| (rule.when)(signal)).map(|rule| rule.then).unwrap_or(default)
}

/// 主导颜色之间相邻色相差的平均值
pub static HARMONY_RULES: &[Rule<f64, ColorHarmony>] = &[
    Rule { when: |d| *d < 30.0, then: ColorHarmony::Monochromatic },
    Rule { when: |d| *d > 150.0, then: ColorHarmony::Complementary },
    Rule { when: |d| *d > 100.0, then: ColorHarmony::Triadic },
    Rule { when: |d| *d > 60.0, then: ColorHarmony::Analogous },
];

/// 纹理分类所需的灰度统计量
#[derive(Debug, Clone, Copy)]
pub struct TextureSignals {
    pub mean: f64,
    pub stddev: f64,
    pub edge_density: f64,
}

pub static TEXTURE_RULES: &[Rule<TextureSignals, Texture>] = &[
    Rule { when: |s| s.stddev < 20.0 && s.edge_density < 10.0, then: Texture::Smooth },
    Rule { when: |s| s.stddev < 30.0 && s.edge_density < 15.0, then: Texture::Matte },
    Rule { when: |s| s.stddev > 80.0 && s.edge_density > 40.0, then: Texture::Rough },
    Rule { when: |s| s.mean > 200.0 && s.stddev < 25.0, then: Texture::Glossy },
    Rule { when: |s| s.edge_density > 30.0, then: Texture::Textured },
];

/// 图案与形状分布分类所需的信号
#[derive(Debug, Clone, Copy)]
pub struct PatternSignals {
    pub edge_density: f64,
    pub repetition: f64,
    pub orientation: Orientation,
}

pub static PATTERN_RULES: &[Rule<PatternSignals, Pattern>] = &[
    Rule { when: |s| s.edge_density < 10.0 && s.repetition < 20.0, then: Pattern::Solid },
    Rule {
        when: |s| s.repetition > 60.0 && s.orientation != Orientation::Mixed,
        then: Pattern::Striped,
    },
    Rule { when: |s| s.repetition > 60.0 && s.edge_density > 40.0, then: Pattern::Checked },
    Rule { when: |s| s.repetition > 60.0, then: Pattern::Geometric },
    Rule { when: |s| s.edge_density > 50.0 && s.repetition > 30.0, then: Pattern::Floral },
    Rule { when: |s| s.edge_density > 40.0 && s.repetition < 30.0, then: Pattern::Abstract },
    Rule { when: |s| s.edge_density > 25.0, then: Pattern::Textured },
];

pub static SHAPE_RULES: &[Rule<PatternSignals, ShapeDistribution>] = &[
    Rule { when: |s| s.edge_density < 15.0, then: ShapeDistribution::Uniform },
    Rule { when: |s| s.repetition > 50.0, then: ShapeDistribution::Scattered },
    Rule { when: |s| s.edge_density > 40.0 && s.repetition < 30.0, then: ShapeDistribution::Random },
];

/// 复杂度分数分档
pub static COMPLEXITY_RULES: &[Rule<f64, ComplexityLevel>] = &[
    Rule { when: |score| *score < 20.0, then: ComplexityLevel::Simple },
    Rule { when: |score| *score < 40.0, then: ComplexityLevel::Moderate },
    Rule { when: |score| *score < 60.0, then: ComplexityLevel::Complex },
];

/// 根据图案、纹理、复杂度推测风格
pub static STYLE_RULES: &[Rule<PatternFeatures, Style>] = &[
    Rule { when: |p| p.pattern == Pattern::Solid && p.texture == Texture::Smooth, then: Style::Minimalist },
    Rule { when: |p| p.pattern == Pattern::Solid && p.texture == Texture::Matte, then: Style::Modern },
    Rule {
        when: |p| p.pattern == Pattern::Geometric && p.complexity.level == ComplexityLevel::Simple,
        then: Style::Contemporary,
    },
    Rule {
        when: |p| p.pattern == Pattern::Geometric && p.complexity.level == ComplexityLevel::Complex,
        then: Style::Industrial,
    },
    Rule { when: |p| p.pattern == Pattern::Floral, then: Style::Bohemian },
    Rule { when: |p| p.pattern == Pattern::Striped, then: Style::Classic },
    Rule {
        when: |p| {
            p.pattern == Pattern::Abstract && p.complexity.level == ComplexityLevel::VeryComplex
        },
        then: Style::Artistic,
    },
    Rule { when: |p| p.texture == Texture::Rough, then: Style::Rustic },
    Rule { when: |p| p.texture == Texture::Glossy, then: Style::Modern },
];

pub fn classify_harmony(avg_hue_diff: f64) -> ColorHarmony {
    first_match(HARMONY_RULES, &avg_hue_diff, ColorHarmony::Varied)
}

pub fn classify_texture(signals: &TextureSignals) -> Texture {
    first_match(TEXTURE_RULES, signals, Texture::Plain)
}

pub fn classify_pattern(signals: &PatternSignals) -> Pattern {
    first_match(PATTERN_RULES, signals, Pattern::Plain)
}

pub fn classify_shape(signals: &PatternSignals) -> ShapeDistribution {
    first_match(SHAPE_RULES, signals, ShapeDistribution::Mixed)
}

pub fn classify_complexity(score: f64) -> ComplexityLevel {
    first_match(COMPLEXITY_RULES, &score, ComplexityLevel::VeryComplex)
}

pub fn suggest_style(pattern: &PatternFeatures) -> Style {
    first_match(STYLE_RULES, pattern, Style::Contemporary)
}
