//! Catalog assembly: read sources, bucket stars by magnitude, write the index.

use crate::cli::{BuildArgs, Cli};
use crate::records::ColumnLayout;
use anyhow::{bail, Context};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use skyview_catalog::index::{default_bands, Catalog, MagnitudeBand};
use skyview_core::SkyError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One input file and how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    #[serde(flatten)]
    pub layout: ColumnLayout,
    #[serde(default)]
    pub skip_lines: usize,
    /// Falls back to the standard bands for the catalog depth.
    #[serde(default)]
    pub bands: Option<Vec<MagnitudeBand>>,
}

#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub lines: u64,
    pub placed: u64,
    pub malformed: u64,
    pub per_level: Vec<u64>,
    pub brightest: Option<f64>,
}

impl IngestStats {
    fn place(&mut self, level: u8, magnitude: f64) {
        let level = level as usize;
        if self.per_level.len() <= level {
            self.per_level.resize(level + 1, 0);
        }
        self.per_level[level] += 1;
        self.placed += 1;
        if self.brightest.map_or(true, |b| magnitude < b) {
            self.brightest = Some(magnitude);
        }
    }

    pub fn merge(&mut self, other: &IngestStats) {
        self.lines += other.lines;
        self.malformed += other.malformed;
        for (level, count) in other.per_level.iter().enumerate() {
            if self.per_level.len() <= level {
                self.per_level.resize(level + 1, 0);
            }
            self.per_level[level] += count;
        }
        self.placed += other.placed;
        self.brightest = match (self.brightest, other.brightest) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

pub fn run(args: &BuildArgs, cli: &Cli) -> anyhow::Result<()> {
    let bands = if args.bands.is_empty() {
        None
    } else {
        Some(
            args.bands
                .iter()
                .map(|b| parse_band(b))
                .collect::<anyhow::Result<Vec<_>>>()?,
        )
    };
    let source = SourceSpec {
        path: args.input.clone(),
        layout: args.layout(),
        skip_lines: args.skip_lines,
        bands,
    };

    let start = Instant::now();
    let progress = create_progress_bar();
    let (catalog, stats) = build_catalog(args.depth, std::slice::from_ref(&source), &progress)?;
    progress.finish_and_clear();

    catalog
        .save(&args.output)
        .with_context(|| format!("Failed to write catalog {:?}", args.output))?;

    print_summary(&args.output, &catalog, &stats, cli.verbose);
    println!("Done in {:.1} s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Builds a catalog `depth` levels deep from `sources`, in order.
pub fn build_catalog(
    depth: u8,
    sources: &[SourceSpec],
    progress: &ProgressBar,
) -> anyhow::Result<(Catalog, IngestStats)> {
    let mut catalog = Catalog::create(depth).context("Failed to create mesh")?;
    let mut total = IngestStats::default();
    for source in sources {
        let stats = ingest_source(&mut catalog, source, progress)?;
        total.merge(&stats);
    }
    Ok((catalog, total))
}

pub fn ingest_source(
    catalog: &mut Catalog,
    source: &SourceSpec,
    progress: &ProgressBar,
) -> anyhow::Result<IngestStats> {
    let bands = source
        .bands
        .clone()
        .unwrap_or_else(|| default_bands(catalog.max_level));
    if let Some(band) = bands.iter().find(|b| b.level > catalog.max_level) {
        bail!(
            "Band {:?} targets level {} but the catalog is only {} levels deep",
            band,
            band.level,
            catalog.max_level
        );
    }

    let reader = open_source(&source.path)?;
    let mut stats = IngestStats::default();
    progress.set_message(format!("{}", source.path.display()));

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {:?}", source.path))?;
        let line_no = index + 1;
        if line_no <= source.skip_lines || line.trim().is_empty() {
            continue;
        }
        stats.lines += 1;
        progress.inc(1);

        match source.layout.parse(&line, line_no, &bands) {
            Ok(record) => {
                catalog.insert(record.level, record.star)?;
                stats.place(record.level, record.magnitude);
            }
            Err(e @ SkyError::MalformedRecord { .. }) => {
                tracing::debug!(source = %source.path.display(), "{}", e);
                stats.malformed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        source = %source.path.display(),
        lines = stats.lines,
        placed = stats.placed,
        skipped = stats.malformed,
        "ingested source"
    );
    if stats.placed == 0 && stats.lines > 0 {
        tracing::warn!(
            source = %source.path.display(),
            "no usable records; check the column layout"
        );
    }
    Ok(stats)
}

fn open_source(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open source {:?}", path))?;
    let gz = path.extension().and_then(|e| e.to_str()) == Some("gz");
    if gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parses `LEVEL:MIN:MAX`.
pub fn parse_band(text: &str) -> anyhow::Result<MagnitudeBand> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        bail!("Invalid band '{}', expected LEVEL:MIN:MAX", text);
    }
    let level: u8 = parts[0]
        .trim()
        .parse()
        .with_context(|| format!("Invalid band level in '{}'", text))?;
    let min_mag: f64 = parts[1]
        .trim()
        .parse()
        .with_context(|| format!("Invalid band minimum in '{}'", text))?;
    let max_mag: f64 = parts[2]
        .trim()
        .parse()
        .with_context(|| format!("Invalid band maximum in '{}'", text))?;
    Ok(MagnitudeBand::new(level, min_mag, max_mag))
}

pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} lines ({per_sec}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

pub fn print_summary(output: &Path, catalog: &Catalog, stats: &IngestStats, verbose: bool) {
    println!("Wrote {:?}", output);
    println!(
        "  {} stars placed, {} lines skipped, depth {}",
        stats.placed, stats.malformed, catalog.max_level
    );
    if let Some(brightest) = stats.brightest {
        println!("  Brightest magnitude: {:.2}", brightest);
    }
    if verbose {
        for (level, count) in catalog.stars_per_level().iter().enumerate() {
            println!("  level {:2}: {:>10} stars", level, count);
        }
    }
}
