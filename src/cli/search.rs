use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::debug;

use crate::catalog::Catalog;
use crate::cli::{SubCommandExtend, print_matches};
use crate::config::{AnalyzeOptions, Opts, SearchOptions};
use crate::ranker::group_by_match_quality;
use crate::utils::OutputFormat;
use crate::{analyze_image, rank_candidates};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub analyze: AnalyzeOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 被搜索的图片路径
    pub image: PathBuf,
    /// 按匹配质量（excellent/good/fair/poor）分组输出
    #[arg(long)]
    pub group: bool,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let options = self.search.rank_options();
        options.validate()?;

        let data = fs::read(&self.image).with_context(|| format!("读取图片失败: {}", self.image.display()))?;
        let features = analyze_image(&data, &self.analyze)?;
        debug!("uploaded image: {:?} / {:?} / {}", features.colors.temperature, features.pattern.pattern, features.style);

        let catalog = Catalog::load(opts.conf_dir.catalog())?;
        let candidates = catalog.in_category(self.search.category.as_deref());
        let results = rank_candidates(&features, &candidates, &options)?;

        if !self.group {
            return print_matches(&results, self.output_format);
        }

        let groups = group_by_match_quality(results);
        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
            OutputFormat::Table => {
                for (name, group) in
                    [("excellent", &groups.excellent), ("good", &groups.good), ("fair", &groups.fair), ("poor", &groups.poor)]
                {
                    println!("[{}]", name);
                    print_matches(group, self.output_format)?;
                }
            }
        }
        Ok(())
    }
}
