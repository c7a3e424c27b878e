//! tabsift: Feature Selection CLI Tool
//!
//! A command-line tool for symmetry checks, dependency ranking and
//! feature selection on CSV and Parquet datasets.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabsift::cli::{commands, Cli, Commands};
use tabsift::utils::print_banner;

fn main() -> Result<()> {
    // RUST_LOG overrides the default level, e.g. RUST_LOG=tabsift=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabsift=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.no_banner {
        print_banner(env!("CARGO_PKG_VERSION"));
    }

    match &cli.command {
        Commands::Symmetry {
            input,
            tolerance,
            infer_schema_length,
        } => commands::run_symmetry(input, *tolerance, *infer_schema_length),
        Commands::Rank {
            input,
            target,
            confidence,
            ascending,
            infer_schema_length,
        } => commands::run_rank(input, target, *confidence, *ascending, *infer_schema_length),
        Commands::Select(args) => commands::run_select(args),
    }
}
