//! CLI argument definitions for forge

use crate::records::{ColorFormat, ColumnLayout, DecFormat, RaFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Build level-of-detail star catalogs from delimited text")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one catalog from one source file
    Build(BuildArgs),

    /// Build every catalog described by a JSON plan
    Plan(PlanArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Source file (delimited text, optionally .gz)
    #[arg(long)]
    pub input: PathBuf,

    /// Output catalog file
    #[arg(long)]
    pub output: PathBuf,

    /// Mesh depth of the catalog
    #[arg(long, default_value = "5")]
    pub depth: u8,

    /// Field separator
    #[arg(long, default_value = ";")]
    pub separator: char,

    /// Leading lines to skip (column headers)
    #[arg(long, default_value = "0")]
    pub skip_lines: usize,

    #[arg(long)]
    pub ra_column: usize,

    #[arg(long, value_enum, default_value = "deg")]
    pub ra_format: RaFormat,

    #[arg(long)]
    pub dec_column: usize,

    #[arg(long, value_enum, default_value = "deg")]
    pub dec_format: DecFormat,

    #[arg(long)]
    pub mag_column: usize,

    #[arg(long)]
    pub color_column: usize,

    #[arg(long, value_enum, default_value = "bv")]
    pub color_format: ColorFormat,

    /// Magnitude band as LEVEL:MIN:MAX, repeatable (default: standard bands for the depth)
    #[arg(long = "band")]
    pub bands: Vec<String>,
}

impl BuildArgs {
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            separator: self.separator,
            ra_column: self.ra_column,
            ra_format: self.ra_format,
            dec_column: self.dec_column,
            dec_format: self.dec_format,
            mag_column: self.mag_column,
            color_column: self.color_column,
            color_format: self.color_format,
        }
    }
}

#[derive(Parser)]
pub struct PlanArgs {
    /// JSON build plan
    pub plan: PathBuf,

    /// Number of catalogs built in parallel (0 = all cores)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,
}
