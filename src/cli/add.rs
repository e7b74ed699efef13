use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator};
use log::{info, warn};
use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

use crate::analyze_image;
use crate::catalog::{Catalog, Upsert};
use crate::cli::SubCommandExtend;
use crate::config::{AnalyzeOptions, Opts};
use crate::features::VisualProfile;
use crate::utils::{hash_bytes, pb_style};

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    #[command(flatten)]
    pub analyze: AnalyzeOptions,
    /// 图片所在目录
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,png,webp")]
    pub suffix: String,
    /// 使用正则表达式从图片路径中提取 name 分组作为商品 ID，默认使用不含后缀的文件名
    /// 例：`/path/to/image/(?<name>[0-9]+).jpg`
    #[arg(short, long, verbatim_doc_comment)]
    pub regex: Option<String>,
    /// 新增商品的类别
    #[arg(long)]
    pub category: Option<String>,
    /// 即使图片没有变化，也重新分析并覆盖旧的视觉记录
    #[arg(long)]
    pub overwrite: bool,
}

/// 单张图片的处理结果
enum Outcome {
    Analyzed { id: String, image: String, hash: String, visual: VisualProfile },
    Skipped(String),
    Failed(String, String),
}

impl SubCommandExtend for AddCommand {
    fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        self.analyze.validate()?;

        let re_suf = Regex::new(&format!("(?i)^({})$", self.suffix.replace(',', "|")))?;
        let re_name = self.regex.as_deref().map(Regex::new).transpose()?;

        let catalog_path = opts.conf_dir.catalog();
        let mut catalog = Catalog::load(&catalog_path)?;

        let entries = scan_directory(&self.path, &re_suf);
        if entries.is_empty() {
            return Err(anyhow!("没有找到图片: {}", self.path.display()));
        }

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        let outcomes = entries
            .par_iter()
            .progress_with(pb.clone())
            .map(|entry| self.process(entry, re_name.as_ref(), &catalog))
            .collect::<Vec<_>>();

        let (mut added, mut updated, mut skipped, mut failed) = (0, 0, 0, 0);
        for outcome in outcomes {
            match outcome {
                Outcome::Analyzed { id, image, hash, visual } => {
                    match catalog.upsert_visual(&id, image, hash, visual, self.category.as_deref()) {
                        Upsert::Added => added += 1,
                        Upsert::Updated => updated += 1,
                    }
                }
                Outcome::Skipped(id) => {
                    pb.set_message(format!("跳过未变化的图片: {}", id));
                    skipped += 1;
                }
                Outcome::Failed(entry, reason) => {
                    warn!("{}: {}", entry, reason);
                    failed += 1;
                }
            }
        }

        catalog.save(&catalog_path)?;
        pb.finish_with_message("图片添加完成");
        info!("新增 {}，更新 {}，跳过 {}，失败 {}", added, updated, skipped, failed);
        println!("added {}, updated {}, skipped {}, failed {}", added, updated, skipped, failed);

        Ok(())
    }
}

impl AddCommand {
    fn process(&self, entry: &str, re_name: Option<&Regex>, catalog: &Catalog) -> Outcome {
        let id = match re_name {
            Some(re) => match re.captures(entry).and_then(|c| c.name("name")) {
                Some(name) => name.as_str().to_string(),
                None => return Outcome::Failed(entry.to_string(), "提取商品 ID 失败".to_string()),
            },
            None => match Path::new(entry).file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => return Outcome::Failed(entry.to_string(), "提取商品 ID 失败".to_string()),
            },
        };

        let data = match fs::read(entry) {
            Ok(data) => data,
            Err(e) => return Outcome::Failed(entry.to_string(), e.to_string()),
        };
        let hash = hash_bytes(&data);
        if !self.overwrite && catalog.is_unchanged(&id, &hash) {
            return Outcome::Skipped(id);
        }

        match analyze_image(&data, &self.analyze) {
            Ok(features) => {
                Outcome::Analyzed { id, image: entry.to_string(), hash, visual: features.profile() }
            }
            Err(e) => Outcome::Failed(entry.to_string(), e.to_string()),
        }
    }
}

fn scan_directory(path: &Path, re_suf: &Regex) -> Vec<String> {
    info!("开始扫描目录: {}", path.display());
    let pb = ProgressBar::no_length().with_style(pb_style());
    let mut entries = WalkDir::new(path)
        .into_iter()
        .progress_with(pb)
        .filter_map(|entry| {
            entry.ok().and_then(|entry| {
                let path = entry.path();
                if path.is_file() {
                    if let Some(ext) = path.extension() {
                        if re_suf.is_match(&ext.to_string_lossy()) {
                            return Some(path.to_string_lossy().to_string());
                        }
                    }
                }
                None
            })
        })
        .collect::<Vec<_>>();
    // 目录遍历顺序与文件系统有关，排序后新增商品的顺序才稳定
    entries.sort();
    info!("扫描完成，共 {} 张图片", entries.len());
    entries
}
