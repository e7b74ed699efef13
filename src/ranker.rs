//! 对候选商品评分、过滤、排序
//!
//! 评分是逐个候选独立计算的，候选较多时用 rayon 并行，并行与串行的结果完全一致。

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::VisualProfile;
use crate::similarity::{Category, Confidence, FactorScores, SimilarityEngine, Weights};

/// 候选数量达到该值时并行评分
const PARALLEL_THRESHOLD: usize = 64;

/// `find_best_matches` 与 `similar_products` 使用的最低分数
pub const BEST_MATCH_MIN_SCORE: f64 = 50.0;

/// 可参与排序的商品
pub trait Candidate: Sync {
    fn id(&self) -> &str;
    fn price(&self) -> Option<f64>;
    fn brand(&self) -> Option<&str>;
    fn in_stock(&self) -> bool;
    fn rating(&self) -> Option<f64>;
    fn views(&self) -> u64 {
        0
    }
    fn purchases(&self) -> u64 {
        0
    }
    fn profile(&self) -> &VisualProfile;
}

impl<C: Candidate + ?Sized> Candidate for &C {
    fn id(&self) -> &str {
        (**self).id()
    }
    fn price(&self) -> Option<f64> {
        (**self).price()
    }
    fn brand(&self) -> Option<&str> {
        (**self).brand()
    }
    fn in_stock(&self) -> bool {
        (**self).in_stock()
    }
    fn rating(&self) -> Option<f64> {
        (**self).rating()
    }
    fn views(&self) -> u64 {
        (**self).views()
    }
    fn purchases(&self) -> u64 {
        (**self).purchases()
    }
    fn profile(&self) -> &VisualProfile {
        (**self).profile()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// 混合价格/热度后的最终分数
    #[default]
    Relevance,
    /// 原始相似度
    Similarity,
    PriceLow,
    PriceHigh,
    Popularity,
    Rating,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Similarity => "similarity",
            SortBy::PriceLow => "price-low",
            SortBy::PriceHigh => "price-high",
            SortBy::Popularity => "popularity",
            SortBy::Rating => "rating",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(SortBy::Relevance),
            "similarity" => Ok(SortBy::Similarity),
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "popularity" => Ok(SortBy::Popularity),
            "rating" => Ok(SortBy::Rating),
            _ => Err(Error::invalid("sort_by", s)),
        }
    }
}

/// 偏好过滤条件，不满足的候选直接排除
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// 为空时不限制品牌
    pub brands: Vec<String>,
    pub in_stock_only: bool,
    pub min_rating: Option<f64>,
}

impl Filters {
    /// 设置了价格或评分下限时，缺少对应数据的候选不会通过
    pub fn accepts<C: Candidate + ?Sized>(&self, candidate: &C) -> bool {
        if let Some(min) = self.min_price {
            if !candidate.price().is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !candidate.price().is_some_and(|p| p <= max) {
                return false;
            }
        }
        if !self.brands.is_empty() && !candidate.brand().is_some_and(|b| self.brands.iter().any(|x| x == b)) {
            return false;
        }
        if self.in_stock_only && !candidate.in_stock() {
            return false;
        }
        if let Some(min) = self.min_rating {
            if !candidate.rating().is_some_and(|r| r >= min) {
                return false;
            }
        }
        true
    }

    fn validate(&self) -> Result<()> {
        for (name, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(v) = bound {
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::invalid(name, v));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(Error::invalid("min_price", format!("{} > max_price {}", min, max)));
            }
        }
        if let Some(v) = self.min_rating {
            if !v.is_finite() {
                return Err(Error::invalid("min_rating", v));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub category: Category,
    pub limit: usize,
    /// 0 ~ 100
    pub min_score: f64,
    pub sort_by: SortBy,
    pub filters: Filters,
    /// 价格分数的混合权重，0 ~ 1
    pub price_weight: f64,
    /// 热度分数的混合权重，0 ~ 1
    pub popularity_weight: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            category: Category::Default,
            limit: 50,
            min_score: 0.0,
            sort_by: SortBy::Relevance,
            filters: Filters::default(),
            price_weight: 0.0,
            popularity_weight: 0.0,
        }
    }
}

impl RankOptions {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::invalid("limit", self.limit));
        }
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(Error::invalid("min_score", self.min_score));
        }
        for (name, w) in [("price_weight", self.price_weight), ("popularity_weight", self.popularity_weight)] {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::invalid(name, w));
            }
        }
        self.filters.validate()
    }
}

/// 一个候选商品的排序结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult<'a, C> {
    pub product: &'a C,
    /// 混合价格/热度后的最终分数
    pub similarity_score: u8,
    /// 相似度引擎给出的原始分数
    pub raw_score: u8,
    pub match_factors: FactorScores,
    pub weights: Weights,
    pub confidence: Confidence,
    pub explanation: Vec<String>,
    /// 从 1 开始
    pub rank: usize,
}

/// 价格越低分数越高，每 100 元扣 1 分
fn price_score(price: f64) -> f64 {
    (100.0 - price / 100.0).max(0.0)
}

fn popularity_score<C: Candidate + ?Sized>(candidate: &C) -> f64 {
    (candidate.views() as f64 / 1000.0 * 50.0 + candidate.purchases() as f64 / 100.0 * 50.0).min(100.0)
}

fn blend(base: f64, aux: f64, weight: f64) -> f64 {
    base * (1.0 - weight) + aux * weight
}

/// 缺失的数值始终排在最后
fn cmp_missing_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn score_one<'a, C: Candidate>(
    engine: &SimilarityEngine,
    query: &VisualProfile,
    candidate: &'a C,
    options: &RankOptions,
) -> MatchResult<'a, C> {
    let similarity = engine.compare(query, candidate.profile());

    let mut score = similarity.overall_score as f64;
    if options.price_weight > 0.0 {
        if let Some(price) = candidate.price().filter(|p| *p > 0.0) {
            score = blend(score, price_score(price), options.price_weight);
        }
    }
    if options.popularity_weight > 0.0 {
        score = blend(score, popularity_score(candidate), options.popularity_weight);
    }

    MatchResult {
        product: candidate,
        similarity_score: score.round().clamp(0.0, 100.0) as u8,
        raw_score: similarity.overall_score,
        match_factors: similarity.breakdown,
        weights: similarity.weights,
        confidence: similarity.confidence(),
        explanation: similarity.explanation(),
        rank: 0,
    }
}

/// 评分、过滤、稳定排序、截断，最后分配名次
pub fn rank<'a, C: Candidate>(
    query: &VisualProfile,
    candidates: &'a [C],
    options: &RankOptions,
) -> Result<Vec<MatchResult<'a, C>>> {
    rank_where(query, candidates, options, |_| true)
}

fn rank_where<'a, C, F>(
    query: &VisualProfile,
    candidates: &'a [C],
    options: &RankOptions,
    keep: F,
) -> Result<Vec<MatchResult<'a, C>>>
where
    C: Candidate,
    F: Fn(&C) -> bool + Sync,
{
    options.validate()?;
    let engine = SimilarityEngine::new(options.category);
    let score = |c: &'a C| keep(c).then(|| score_one(&engine, query, c, options));

    // collect 保持输入顺序
    let scored: Vec<MatchResult<'a, C>> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.par_iter().filter_map(score).collect()
    } else {
        candidates.iter().filter_map(score).collect()
    };
    let total = scored.len();

    let mut results = scored
        .into_iter()
        .filter(|m| m.similarity_score as f64 >= options.min_score)
        .filter(|m| options.filters.accepts(m.product))
        .collect::<Vec<_>>();

    // sort_by 是稳定排序，相同的键保持输入顺序
    match options.sort_by {
        SortBy::Relevance => results.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score)),
        SortBy::Similarity => results.sort_by(|a, b| b.raw_score.cmp(&a.raw_score)),
        SortBy::PriceLow => results.sort_by(|a, b| cmp_missing_last(a.product.price(), b.product.price(), false)),
        SortBy::PriceHigh => results.sort_by(|a, b| cmp_missing_last(a.product.price(), b.product.price(), true)),
        SortBy::Popularity => results.sort_by(|a, b| b.product.views().cmp(&a.product.views())),
        SortBy::Rating => results.sort_by(|a, b| cmp_missing_last(a.product.rating(), b.product.rating(), true)),
    }
    results.truncate(options.limit);
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }

    debug!("ranked {} candidates, {} scored, {} returned", candidates.len(), total, results.len());
    Ok(results)
}

/// 最低分数 50 的相关度排序
pub fn find_best_matches<'a, C: Candidate>(
    query: &VisualProfile,
    candidates: &'a [C],
    category: Category,
    count: usize,
) -> Result<Vec<MatchResult<'a, C>>> {
    let options = RankOptions { category, limit: count, min_score: BEST_MATCH_MIN_SCORE, ..Default::default() };
    rank(query, candidates, &options)
}

/// 以目录中某个商品的视觉记录为查询，排除该商品本身
pub fn similar_products<'a, C: Candidate>(
    product_id: &str,
    candidates: &'a [C],
    category: Category,
    limit: usize,
) -> Result<Vec<MatchResult<'a, C>>> {
    let product = candidates
        .iter()
        .find(|c| c.id() == product_id)
        .ok_or_else(|| Error::ProductNotFound(product_id.to_string()))?;
    let options = RankOptions { category, limit, min_score: BEST_MATCH_MIN_SCORE, ..Default::default() };
    rank_where(product.profile(), candidates, &options, |c| c.id() != product_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchQuality {
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => MatchQuality::Excellent,
            70..85 => MatchQuality::Good,
            50..70 => MatchQuality::Fair,
            _ => MatchQuality::Poor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QualityGroups<'a, C> {
    pub excellent: Vec<MatchResult<'a, C>>,
    pub good: Vec<MatchResult<'a, C>>,
    pub fair: Vec<MatchResult<'a, C>>,
    pub poor: Vec<MatchResult<'a, C>>,
}

/// 按最终分数分组，组内保持原有顺序
pub fn group_by_match_quality<C>(results: Vec<MatchResult<'_, C>>) -> QualityGroups<'_, C> {
    let mut groups = QualityGroups { excellent: vec![], good: vec![], fair: vec![], poor: vec![] };
    for result in results {
        match MatchQuality::from_score(result.similarity_score) {
            MatchQuality::Excellent => groups.excellent.push(result),
            MatchQuality::Good => groups.good.push(result),
            MatchQuality::Fair => groups.fair.push(result),
            MatchQuality::Poor => groups.poor.push(result),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Pattern, Style, Temperature, Texture};

    struct Item {
        id: &'static str,
        price: Option<f64>,
        brand: Option<&'static str>,
        in_stock: bool,
        rating: Option<f64>,
        views: u64,
        profile: VisualProfile,
    }

    impl Candidate for Item {
        fn id(&self) -> &str {
            self.id
        }
        fn price(&self) -> Option<f64> {
            self.price
        }
        fn brand(&self) -> Option<&str> {
            self.brand
        }
        fn in_stock(&self) -> bool {
            self.in_stock
        }
        fn rating(&self) -> Option<f64> {
            self.rating
        }
        fn views(&self) -> u64 {
            self.views
        }
        fn profile(&self) -> &VisualProfile {
            &self.profile
        }
    }

    fn item(id: &'static str, brightness: u8) -> Item {
        Item {
            id,
            price: Some(100.0),
            brand: Some("acme"),
            in_stock: true,
            rating: Some(4.0),
            views: 0,
            profile: VisualProfile {
                brightness: Some(brightness),
                contrast: Some(50),
                temperature: Some(Temperature::Cool),
                pattern: Some(Pattern::Solid),
                texture: Some(Texture::Smooth),
                style: Some(Style::Modern),
                ..Default::default()
            },
        }
    }

    fn query() -> VisualProfile {
        item("query", 50).profile
    }

    #[test]
    fn test_ranks_contiguous_and_sorted() {
        let items = vec![item("a", 10), item("b", 50), item("c", 30)];
        let results = rank(&query(), &items, &RankOptions::default()).unwrap();
        assert_eq!(results.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = vec![item("first", 40), item("second", 40), item("third", 40)];
        let results = rank(&query(), &items, &RankOptions::default()).unwrap();
        assert_eq!(results.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let items = (0..200).map(|i| item("x", (i % 101) as u8)).collect::<Vec<_>>();
        let parallel = rank(&query(), &items, &RankOptions { limit: 500, ..Default::default() }).unwrap();
        let serial = rank(&query(), &items[..50], &RankOptions { limit: 500, ..Default::default() }).unwrap();
        assert_eq!(parallel.len(), 200);
        // 两次结果中来自同一候选的分数相同
        for s in &serial {
            let p = parallel.iter().find(|p| std::ptr::eq(p.product, s.product)).unwrap();
            assert_eq!(p.similarity_score, s.similarity_score);
        }
    }

    #[test]
    fn test_filters() {
        let mut cheap = item("cheap", 50);
        cheap.price = Some(10.0);
        let mut other_brand = item("other", 50);
        other_brand.brand = Some("globex");
        let mut sold_out = item("sold-out", 50);
        sold_out.in_stock = false;
        let mut unrated = item("unrated", 50);
        unrated.rating = None;
        let items = vec![cheap, other_brand, sold_out, unrated, item("ok", 50)];

        let options = RankOptions {
            filters: Filters {
                min_price: Some(50.0),
                max_price: Some(500.0),
                brands: vec!["acme".to_string()],
                in_stock_only: true,
                min_rating: Some(3.5),
            },
            ..Default::default()
        };
        let results = rank(&query(), &items, &options).unwrap();
        assert_eq!(results.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_sort_by_price() {
        let mut a = item("a", 50);
        a.price = Some(30.0);
        let mut b = item("b", 50);
        b.price = None;
        let mut c = item("c", 50);
        c.price = Some(10.0);
        let items = vec![a, b, c];

        let low = rank(&query(), &items, &RankOptions { sort_by: SortBy::PriceLow, ..Default::default() }).unwrap();
        assert_eq!(low.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["c", "a", "b"]);
        let high = rank(&query(), &items, &RankOptions { sort_by: SortBy::PriceHigh, ..Default::default() }).unwrap();
        assert_eq!(high.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_popularity_blend() {
        let mut popular = item("popular", 50);
        popular.views = 2000;
        let items = vec![item("plain", 50), popular];
        let options = RankOptions { popularity_weight: 0.5, ..Default::default() };
        let results = rank(&query(), &items, &options).unwrap();
        assert_eq!(results[0].product.id, "popular");
        assert_eq!(results[0].raw_score, results[1].raw_score);
        assert!(results[0].similarity_score > results[1].similarity_score);
    }

    #[test]
    fn test_price_blend() {
        let mut expensive = item("expensive", 50);
        expensive.price = Some(9000.0);
        let cheap = item("cheap", 40);
        let mut unpriced = item("unpriced", 50);
        unpriced.price = None;
        let mut free = item("free", 50);
        free.price = Some(0.0);
        let items = vec![expensive, cheap, unpriced, free];

        let plain = rank(&query(), &items, &RankOptions::default()).unwrap();
        assert_eq!(plain.iter().find(|r| r.product.id == "cheap").unwrap().rank, 4);

        let options = RankOptions { price_weight: 0.3, ..Default::default() };
        let results = rank(&query(), &items, &options).unwrap();
        let find = |id: &str| results.iter().find(|r| r.product.id == id).unwrap();

        assert_eq!(results[0].product.id, "cheap");
        assert!(find("cheap").raw_score < find("expensive").raw_score);
        assert!(find("expensive").similarity_score < find("expensive").raw_score);
        // 没有价格或价格不大于 0 的商品保持原始分数
        assert_eq!(find("unpriced").similarity_score, find("unpriced").raw_score);
        assert_eq!(find("free").similarity_score, find("free").raw_score);
    }

    #[test]
    fn test_invalid_options() {
        let items = vec![item("a", 50)];
        let bad = [
            RankOptions { limit: 0, ..Default::default() },
            RankOptions { min_score: f64::NAN, ..Default::default() },
            RankOptions { min_score: 101.0, ..Default::default() },
            RankOptions { price_weight: 1.5, ..Default::default() },
            RankOptions {
                filters: Filters { min_price: Some(10.0), max_price: Some(5.0), ..Default::default() },
                ..Default::default()
            },
        ];
        for options in bad {
            assert!(matches!(rank(&query(), &items, &options), Err(Error::InvalidOptions { .. })));
        }
    }

    #[test]
    fn test_similar_products_excludes_self() {
        let items = vec![item("a", 50), item("b", 50), item("c", 0)];
        let results = similar_products("a", &items, Category::Default, 10).unwrap();
        assert!(results.iter().all(|r| r.product.id != "a"));
        assert_eq!(results[0].product.id, "b");

        assert!(matches!(similar_products("zzz", &items, Category::Default, 10), Err(Error::ProductNotFound(_))));
    }

    #[test]
    fn test_group_by_match_quality() {
        assert_eq!(MatchQuality::from_score(85), MatchQuality::Excellent);
        assert_eq!(MatchQuality::from_score(84), MatchQuality::Good);
        assert_eq!(MatchQuality::from_score(50), MatchQuality::Fair);
        assert_eq!(MatchQuality::from_score(49), MatchQuality::Poor);

        let mut unrelated = item("unrelated", 100);
        unrelated.profile.temperature = Some(Temperature::Warm);
        unrelated.profile.pattern = Some(Pattern::Floral);
        unrelated.profile.texture = Some(Texture::Rough);
        unrelated.profile.style = Some(Style::Bohemian);
        let items = vec![item("a", 50), unrelated];
        let groups = group_by_match_quality(rank(&query(), &items, &RankOptions::default()).unwrap());
        assert_eq!(groups.good.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(groups.poor.iter().map(|r| r.product.id).collect::<Vec<_>>(), vec!["unrelated"]);
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!("price-low".parse::<SortBy>().unwrap(), SortBy::PriceLow);
        assert!("newest".parse::<SortBy>().is_err());
    }
}
