pub mod catalog;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod features;
pub mod grid;
pub mod pattern;
pub mod ranker;
pub mod rules;
pub mod similarity;
pub mod utils;

use std::time::Instant;

use log::debug;

pub use config::{AnalyzeOptions, Opts};
pub use error::{Error, Result};
pub use features::{FeatureVector, VisualProfile};
pub use grid::SourceImage;
pub use ranker::{Candidate, MatchResult, RankOptions};
pub use similarity::{Category, SimilarityEngine};

/// 解码图片并提取完整的特征向量
///
/// 只有解码失败或参数不合法时才会返回错误，任何内容的图片都能得到完整的结果
pub fn analyze_image(bytes: &[u8], options: &AnalyzeOptions) -> Result<FeatureVector> {
    options.validate()?;
    let image = SourceImage::decode(bytes)?;
    Ok(analyze_source(&image, options))
}

/// 对已经解码的图片提取特征，颜色分析与图案分析并行执行
pub fn analyze_source(image: &SourceImage, options: &AnalyzeOptions) -> FeatureVector {
    let start = Instant::now();
    let (colors, pattern) =
        rayon::join(|| color::analyze_colors(image, options), || pattern::analyze_pattern(image));
    let style = rules::suggest_style(&pattern);
    debug!("analyzed {:?} image in {:.2?}", image.dimensions(), start.elapsed());
    FeatureVector { colors, pattern, style }
}

/// 按上传图片的特征对候选商品排序
pub fn rank_candidates<'a, C: Candidate>(
    uploaded: &FeatureVector,
    candidates: &'a [C],
    options: &RankOptions,
) -> Result<Vec<MatchResult<'a, C>>> {
    ranker::rank(&uploaded.profile(), candidates, options)
}
