mod add;
mod analyze;
mod search;
mod similar;

pub use add::*;
pub use analyze::*;
pub use search::*;
pub use similar::*;

use serde::Serialize;

use crate::config::Opts;
use crate::ranker::{Candidate, MatchResult};
use crate::utils::OutputFormat;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> anyhow::Result<()>;
}

fn print_matches<C: Candidate + Serialize>(results: &[MatchResult<'_, C>], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?)
        }
        OutputFormat::Table => {
            if results.is_empty() {
                eprintln!("没有找到匹配的商品");
            }
            for r in results {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    r.rank,
                    r.similarity_score,
                    r.product.id(),
                    r.confidence.level,
                    r.explanation.join("; ")
                );
            }
        }
    }
    Ok(())
}
