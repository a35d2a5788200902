//! Forge: star catalog build CLI
//!
//! Reads delimited star lists (Hipparcos, Tycho-2, Yale Bright Star and
//! similar exports), buckets stars into mesh levels by magnitude and writes
//! skyview catalogs.

mod build;
mod cli;
mod plan;
mod records;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Build(args) => build::run(args, &cli),
        Commands::Plan(args) => plan::run(args, &cli),
    }
}
