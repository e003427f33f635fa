mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{classify, critical_day, pipeline};

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // Already initialized is fine (e.g. when embedded in tests).
    let _ = builder.try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logger(cli.verbose);
    match &cli.command {
        Commands::CriticalDay(args) => critical_day::run(&cli, args),
        Commands::Classify(args) => classify::run(&cli, args),
        Commands::Run(args) => pipeline::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
