use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 商品类别，决定相似度各项的权重
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shoes,
    Clothing,
    Accessories,
    Furniture,
    Electronics,
    #[default]
    Default,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shoes => "shoes",
            Category::Clothing => "clothing",
            Category::Accessories => "accessories",
            Category::Furniture => "furniture",
            Category::Electronics => "electronics",
            Category::Default => "default",
        }
    }

    pub fn weights(&self) -> &'static Weights {
        match self {
            Category::Shoes => &SHOES,
            Category::Clothing => &CLOTHING,
            Category::Accessories => &ACCESSORIES,
            Category::Furniture => &FURNITURE,
            Category::Electronics => &ELECTRONICS,
            Category::Default => &DEFAULT,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知类别回退到默认权重，不会失败
impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "shoes" => Category::Shoes,
            "clothing" => Category::Clothing,
            "accessories" => Category::Accessories,
            "furniture" => Category::Furniture,
            "electronics" => Category::Electronics,
            _ => Category::Default,
        })
    }
}

/// 相似度的六个因子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Color,
    Pattern,
    Brightness,
    Contrast,
    Texture,
    Style,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::Color,
        Factor::Pattern,
        Factor::Brightness,
        Factor::Contrast,
        Factor::Texture,
        Factor::Style,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Color => "color",
            Factor::Pattern => "pattern",
            Factor::Brightness => "brightness",
            Factor::Contrast => "contrast",
            Factor::Texture => "texture",
            Factor::Style => "style",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 每个因子的权重，总和为 1
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Weights {
    pub color: f64,
    pub pattern: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub texture: f64,
    pub style: f64,
}

impl Weights {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Color => self.color,
            Factor::Pattern => self.pattern,
            Factor::Brightness => self.brightness,
            Factor::Contrast => self.contrast,
            Factor::Texture => self.texture,
            Factor::Style => self.style,
        }
    }

    /// 权重大于 0 的因子
    pub fn active(&self) -> impl Iterator<Item = Factor> + '_ {
        Factor::ALL.into_iter().filter(|f| self.get(*f) > 0.0)
    }

    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }
}

pub static SHOES: Weights =
    Weights { color: 0.45, pattern: 0.20, brightness: 0.10, contrast: 0.05, texture: 0.20, style: 0.0 };

pub static CLOTHING: Weights =
    Weights { color: 0.40, pattern: 0.30, brightness: 0.10, contrast: 0.05, texture: 0.15, style: 0.0 };

pub static ACCESSORIES: Weights =
    Weights { color: 0.50, pattern: 0.20, brightness: 0.15, contrast: 0.10, texture: 0.05, style: 0.0 };

pub static FURNITURE: Weights =
    Weights { color: 0.30, pattern: 0.10, brightness: 0.05, contrast: 0.0, texture: 0.30, style: 0.25 };

pub static ELECTRONICS: Weights =
    Weights { color: 0.35, pattern: 0.05, brightness: 0.25, contrast: 0.15, texture: 0.20, style: 0.0 };

pub static DEFAULT: Weights =
    Weights { color: 0.40, pattern: 0.25, brightness: 0.10, contrast: 0.10, texture: 0.10, style: 0.05 };
