use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::error::{Error, Result};
use crate::ranker::{Filters, RankOptions, SortBy};

static CONF_DIR: LazyLock<String> = LazyLock::new(|| {
    ProjectDirs::from("", "vismatch", "vismatch")
        .map(|dirs| dirs.config_dir().to_string_lossy().to_string())
        .unwrap_or_else(|| ".vismatch".to_string())
});

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// 提取的主导颜色数量
    #[arg(short = 'n', long, value_name = "N", default_value_t = 5)]
    pub num_colors: usize,
    /// 颜色分析时图片缩放到的宽度
    #[arg(long, value_name = "WIDTH", default_value_t = 100)]
    pub resize_width: u32,
    /// 颜色分析时图片缩放到的高度
    #[arg(long, value_name = "HEIGHT", default_value_t = 100)]
    pub resize_height: u32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { num_colors: 5, resize_width: 100, resize_height: 100 }
    }
}

impl AnalyzeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.num_colors == 0 {
            return Err(Error::invalid("num_colors", self.num_colors));
        }
        if self.resize_width == 0 || self.resize_height == 0 {
            return Err(Error::invalid("resize", format!("{}x{}", self.resize_width, self.resize_height)));
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 商品类别，决定相似度权重，同时只在该类别的商品中搜索
    #[arg(long)]
    pub category: Option<String>,
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = 50)]
    pub count: usize,
    /// 最低相似度，范围从 0 到 100
    #[arg(long, value_name = "SCORE", default_value_t = 30.)]
    pub min_score: f64,
    /// 排序方式：relevance, similarity, price-low, price-high, popularity, rating
    #[arg(long, default_value = "relevance")]
    pub sort_by: SortBy,
    /// 最低价格
    #[arg(long)]
    pub min_price: Option<f64>,
    /// 最高价格
    #[arg(long)]
    pub max_price: Option<f64>,
    /// 只保留这些品牌，可以多次指定
    #[arg(long = "brand", value_name = "BRAND")]
    pub brands: Vec<String>,
    /// 只保留有库存的商品
    #[arg(long)]
    pub in_stock_only: bool,
    /// 最低评分
    #[arg(long)]
    pub min_rating: Option<f64>,
    /// 价格分数的混合权重，范围从 0 到 1
    #[arg(long, value_name = "WEIGHT", default_value_t = 0.)]
    pub price_weight: f64,
    /// 热度分数的混合权重，范围从 0 到 1
    #[arg(long, value_name = "WEIGHT", default_value_t = 0.)]
    pub popularity_weight: f64,
}

impl SearchOptions {
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            category: self.category.as_deref().unwrap_or_default().parse().unwrap_or_default(),
            limit: self.count,
            min_score: self.min_score,
            sort_by: self.sort_by,
            filters: Filters {
                min_price: self.min_price,
                max_price: self.max_price,
                brands: self.brands.clone(),
                in_stock_only: self.in_stock_only,
                min_rating: self.min_rating,
            },
            price_weight: self.price_weight,
            popularity_weight: self.popularity_weight,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vismatch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// vismatch 配置文件目录
    #[arg(short, long, default_value = CONF_DIR.as_str())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 分析单张图片的颜色、图案和风格
    Analyze(AnalyzeCommand),
    /// 分析目录中的图片并写入商品目录
    Add(AddCommand),
    /// 用图片在商品目录中搜索相似商品
    Search(SearchCommand),
    /// 查找与目录中某个商品相似的商品
    Similar(SimilarCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回商品目录文件的路径
    pub fn catalog(&self) -> PathBuf {
        self.path.join("catalog.json")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}
