use clap::Parser;

use crate::catalog::Catalog;
use crate::cli::{SubCommandExtend, print_matches};
use crate::config::Opts;
use crate::ranker::similar_products;
use crate::similarity::Category;
use crate::utils::OutputFormat;

#[derive(Parser, Debug, Clone)]
pub struct SimilarCommand {
    /// 商品 ID
    pub id: String,
    /// 选择相似度权重的类别，默认使用该商品自身的类别
    #[arg(long)]
    pub category: Option<String>,
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub count: usize,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SimilarCommand {
    fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let catalog = Catalog::load(opts.conf_dir.catalog())?;
        let product = catalog.find(&self.id)?;
        let category = match &self.category {
            Some(category) => category.parse::<Category>().unwrap_or_default(),
            None => product.category(),
        };

        let results = similar_products(&self.id, &catalog.products, category, self.count)?;
        print_matches(&results, self.output_format)
    }
}
