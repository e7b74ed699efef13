//! 图案分析：边缘密度、线条方向、块重复度、对称性、纹理、复杂度
//!
//! 各个检测器只读取共享的灰度/彩色网格，彼此独立，使用 rayon 并行计算。
//! 任意检测器无法得出结果时返回中性值，而不是让整个分析失败。

mod detect;

use log::debug;

use crate::features::{Complexity, Orientation, Pattern, PatternFeatures, ShapeDistribution, Symmetry, Texture};
use crate::grid::{GrayGrid, PixelGrid, SourceImage};
use crate::rules::{PatternSignals, TextureSignals, classify_pattern, classify_shape, classify_texture};

/// 边缘检测、纹理统计和复杂度使用的分辨率
pub const FINE_RESOLUTION: u32 = 200;

/// 方向、块重复度和对称性使用的分辨率。块重复度的计算量与块数的平方成正比，
/// 100x100 配合 10x10 的块共 100 块、4950 次比较
pub const COARSE_RESOLUTION: u32 = 100;

/// 图案分析所需的全部网格
pub struct PatternGrids {
    pub fine: GrayGrid,
    pub coarse: GrayGrid,
    pub color: PixelGrid,
}

impl PatternGrids {
    pub fn from_image(image: &SourceImage) -> Self {
        let ((fine, coarse), color) = rayon::join(
            || rayon::join(|| image.gray_grid(FINE_RESOLUTION), || image.gray_grid(COARSE_RESOLUTION)),
            || image.rgba_grid(FINE_RESOLUTION, FINE_RESOLUTION),
        );
        Self { fine, coarse, color }
    }
}

pub fn analyze_pattern(image: &SourceImage) -> PatternFeatures {
    analyze_grids(&PatternGrids::from_image(image))
}

pub fn analyze_grids(grids: &PatternGrids) -> PatternFeatures {
    let ((edge_density, stats), (orientation, (repetition, symmetry))) = rayon::join(
        || rayon::join(|| detect::edge_density(&grids.fine), || grids.fine.mean_stddev()),
        || {
            rayon::join(
                || detect::line_orientation(&grids.coarse),
                || rayon::join(|| detect::repetition(&grids.coarse), || detect::symmetry(&grids.coarse)),
            )
        },
    );

    debug!(
        "pattern signals: edge {:?}, repetition {:?}, orientation {:?}, stats {:?}",
        edge_density, repetition, orientation, stats
    );

    let signals = PatternSignals {
        edge_density: edge_density.unwrap_or(0.0),
        repetition: repetition.unwrap_or(0.0),
        orientation: orientation.unwrap_or(Orientation::Mixed),
    };
    let no_signal = edge_density.is_none() && repetition.is_none();

    let pattern = if no_signal { Pattern::Unknown } else { classify_pattern(&signals) };
    let shape_distribution =
        if no_signal { ShapeDistribution::Unknown } else { classify_shape(&signals) };
    let texture = match stats {
        Some((mean, stddev)) => {
            classify_texture(&TextureSignals { mean, stddev, edge_density: signals.edge_density })
        }
        None => Texture::Unknown,
    };
    let complexity = detect::complexity(&grids.color, signals.edge_density, signals.repetition)
        .unwrap_or(Complexity::UNKNOWN);

    PatternFeatures {
        pattern,
        texture,
        complexity,
        symmetry: symmetry.unwrap_or(Symmetry::default()),
        shape_distribution,
        orientation: signals.orientation,
    }
}
