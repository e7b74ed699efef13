use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use crate::analyze_image;
use crate::cli::SubCommandExtend;
use crate::config::{AnalyzeOptions, Opts};
use crate::utils::OutputFormat;

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeCommand {
    #[command(flatten)]
    pub analyze: AnalyzeOptions,
    /// 图片路径
    pub image: PathBuf,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for AnalyzeCommand {
    fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let data = fs::read(&self.image).with_context(|| format!("读取图片失败: {}", self.image.display()))?;
        let features = analyze_image(&data, &self.analyze)?;

        match self.output_format {
            OutputFormat::Json => {
                let output = json!({
                    "features": features,
                    "tags": features.pattern.tags(),
                    "palette": features.colors.palette_swatches(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let colors = &features.colors;
                let pattern = &features.pattern;
                let dominant = colors
                    .dominant_colors
                    .iter()
                    .zip(&colors.color_palette)
                    .map(|(c, name)| format!("{} {} {}%", c.hex, name, c.percentage))
                    .collect::<Vec<_>>();
                println!("colors\t{}", dominant.join(", "));
                println!("primary\t{} {}", colors.primary_color.color.hex, colors.primary_color.name);
                println!("brightness\t{}", colors.brightness);
                println!("contrast\t{}", colors.contrast);
                println!("harmony\t{}", colors.color_harmony);
                println!("temperature\t{}", colors.temperature);
                println!("grayscale\t{}", colors.is_grayscale);
                println!("pattern\t{}", pattern.pattern);
                println!("texture\t{}", pattern.texture);
                println!("complexity\t{} ({})", pattern.complexity.score, pattern.complexity.level);
                println!("symmetry\t{}", pattern.symmetry.overall);
                println!("orientation\t{}", pattern.orientation);
                println!("shape\t{}", pattern.shape_distribution);
                println!("style\t{}", features.style);
                println!("tags\t{}", pattern.tags().join(", "));
            }
        }
        Ok(())
    }
}
