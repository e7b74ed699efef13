//! 图片特征的数据模型
//!
//! [`FeatureVector`] 是对单张图片分析后的完整结果，[`VisualProfile`] 则是商品目录中持久化的视觉记录，
//! 其中任意字段都可能缺失。相似度计算统一在 [`VisualProfile`] 之间进行。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 为标签枚举生成 `as_str`、`Display` 与 `FromStr`
macro_rules! labels {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(format!("无效的 {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsl {
    /// 色相，单位为度
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantColor {
    /// `#RRGGBB`，大写
    pub hex: String,
    /// 手工录入的目录记录可能只有 hex，比较时以 hex 为准
    #[serde(default)]
    pub rgb: Rgb,
    pub percentage: u8,
    #[serde(default)]
    pub count: u32,
}

/// 主色/辅色：主导颜色加上名称与 HSL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColor {
    #[serde(flatten)]
    pub color: DominantColor,
    pub name: String,
    pub hsl: Hsl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorHarmony {
    Monochromatic,
    Complementary,
    Triadic,
    Analogous,
    Varied,
}

labels!(ColorHarmony {
    Monochromatic => "monochromatic",
    Complementary => "complementary",
    Triadic => "triadic",
    Analogous => "analogous",
    Varied => "varied",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Warm,
    Cool,
    Neutral,
}

labels!(Temperature { Warm => "warm", Cool => "cool", Neutral => "neutral" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorFeatures {
    pub dominant_colors: Vec<DominantColor>,
    /// 与 `dominant_colors` 一一对应的颜色名称
    pub color_palette: Vec<String>,
    pub primary_color: NamedColor,
    pub secondary_color: NamedColor,
    pub brightness: u8,
    pub contrast: u8,
    pub color_harmony: ColorHarmony,
    pub is_grayscale: bool,
    pub temperature: Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    Solid,
    Striped,
    Checked,
    Floral,
    Geometric,
    Abstract,
    Textured,
    Plain,
    Unknown,
}

labels!(Pattern {
    Solid => "solid",
    Striped => "striped",
    Checked => "checked",
    Floral => "floral",
    Geometric => "geometric",
    Abstract => "abstract",
    Textured => "textured",
    Plain => "plain",
    Unknown => "unknown",
});

/// 纹理。分析器只会产生前七种，材质类纹理只出现在商品目录中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    Smooth,
    Rough,
    Glossy,
    Matte,
    Textured,
    Plain,
    Unknown,
    Fabric,
    Leather,
    Metal,
    Wood,
    Plastic,
}

labels!(Texture {
    Smooth => "smooth",
    Rough => "rough",
    Glossy => "glossy",
    Matte => "matte",
    Textured => "textured",
    Plain => "plain",
    Unknown => "unknown",
    Fabric => "fabric",
    Leather => "leather",
    Metal => "metal",
    Wood => "wood",
    Plastic => "plastic",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
    #[serde(rename = "very complex")]
    VeryComplex,
    Unknown,
}

labels!(ComplexityLevel {
    Simple => "simple",
    Moderate => "moderate",
    Complex => "complex",
    VeryComplex => "very complex",
    Unknown => "unknown",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub score: u8,
    pub level: ComplexityLevel,
}

impl Complexity {
    pub const UNKNOWN: Complexity = Complexity { score: 0, level: ComplexityLevel::Unknown };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Symmetry {
    pub horizontal: u8,
    pub vertical: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeDistribution {
    Uniform,
    Scattered,
    Random,
    Mixed,
    Unknown,
}

labels!(ShapeDistribution {
    Uniform => "uniform",
    Scattered => "scattered",
    Random => "random",
    Mixed => "mixed",
    Unknown => "unknown",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
    Mixed,
}

labels!(Orientation { Horizontal => "horizontal", Vertical => "vertical", Mixed => "mixed" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Minimalist,
    Modern,
    Contemporary,
    Industrial,
    Bohemian,
    Classic,
    Artistic,
    Rustic,
    Vintage,
    Abstract,
}

labels!(Style {
    Minimalist => "minimalist",
    Modern => "modern",
    Contemporary => "contemporary",
    Industrial => "industrial",
    Bohemian => "bohemian",
    Classic => "classic",
    Artistic => "artistic",
    Rustic => "rustic",
    Vintage => "vintage",
    Abstract => "abstract",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFeatures {
    pub pattern: Pattern,
    pub texture: Texture,
    pub complexity: Complexity,
    pub symmetry: Symmetry,
    pub shape_distribution: ShapeDistribution,
    pub orientation: Orientation,
}

impl PatternFeatures {
    /// 用于展示和检索的标签
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![
            self.pattern.to_string(),
            self.texture.to_string(),
            self.complexity.level.to_string(),
        ];
        if self.symmetry.overall > 70 {
            tags.push("symmetric".to_string());
        }
        if self.orientation != Orientation::Mixed {
            tags.push(format!("{}-lines", self.orientation));
        }
        if self.shape_distribution != ShapeDistribution::Unknown {
            tags.push(self.shape_distribution.to_string());
        }
        tags
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub colors: ColorFeatures,
    pub pattern: PatternFeatures,
    pub style: Style,
}

impl FeatureVector {
    pub fn profile(&self) -> VisualProfile {
        VisualProfile::from(self)
    }
}

/// 商品目录中保存的视觉记录，任何字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualProfile {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dominant_colors: Vec<DominantColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<Texture>,
    /// 复杂度分数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u8>,
    /// 整体对称度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symmetry: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl From<&FeatureVector> for VisualProfile {
    fn from(features: &FeatureVector) -> Self {
        let colors = &features.colors;
        let pattern = &features.pattern;
        Self {
            dominant_colors: colors.dominant_colors.clone(),
            color_palette: Some(colors.color_palette.clone()),
            primary_hue: Some(colors.primary_color.hsl.h),
            temperature: Some(colors.temperature),
            brightness: Some(colors.brightness),
            contrast: Some(colors.contrast),
            pattern: Some(pattern.pattern),
            texture: Some(pattern.texture),
            complexity: Some(pattern.complexity.score),
            symmetry: Some(pattern.symmetry.overall),
            style: Some(features.style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pattern() -> PatternFeatures {
        PatternFeatures {
            pattern: Pattern::Striped,
            texture: Texture::Smooth,
            complexity: Complexity { score: 45, level: ComplexityLevel::Complex },
            symmetry: Symmetry { horizontal: 80, vertical: 90, overall: 85 },
            shape_distribution: ShapeDistribution::Scattered,
            orientation: Orientation::Vertical,
        }
    }

    #[test]
    fn test_labels_roundtrip() {
        for level in ComplexityLevel::ALL {
            assert_eq!(level.as_str().parse::<ComplexityLevel>().unwrap(), *level);
        }
        assert!("bumpy".parse::<Texture>().is_err());
    }

    #[test]
    fn test_serde_matches_labels() {
        for level in ComplexityLevel::ALL {
            let json = serde_json::to_string(level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
        for style in Style::ALL {
            let json = serde_json::to_string(style).unwrap();
            assert_eq!(json, format!("\"{}\"", style.as_str()));
        }
    }

    #[test]
    fn test_pattern_tags() {
        let tags = sample_pattern().tags();
        assert_eq!(
            tags,
            vec!["striped", "smooth", "complex", "symmetric", "vertical-lines", "scattered"]
        );
    }

    #[test]
    fn test_pattern_tags_omit_mixed_and_unknown() {
        let mut pattern = sample_pattern();
        pattern.orientation = Orientation::Mixed;
        pattern.shape_distribution = ShapeDistribution::Unknown;
        pattern.symmetry.overall = 70;
        assert_eq!(pattern.tags(), vec!["striped", "smooth", "complex"]);
    }

    #[test]
    fn test_profile_deserialize_partial() {
        let profile: VisualProfile =
            serde_json::from_str(r#"{"brightness": 40, "texture": "leather"}"#).unwrap();
        assert_eq!(profile.brightness, Some(40));
        assert_eq!(profile.texture, Some(Texture::Leather));
        assert!(profile.pattern.is_none());
        assert!(profile.dominant_colors.is_empty());
    }
}
