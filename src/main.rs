use clap::Parser;

use vismatch::cli::SubCommandExtend;
use vismatch::config::{Opts, SubCommand};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Analyze(config) => config.run(&opts),
        SubCommand::Add(config) => config.run(&opts),
        SubCommand::Search(config) => config.run(&opts),
        SubCommand::Similar(config) => config.run(&opts),
    }
}
