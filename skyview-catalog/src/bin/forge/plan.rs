//! Multi-catalog builds described by a JSON plan.
//!
//! ```json
//! {
//!   "catalogs": [
//!     {
//!       "output": "Catalog/Combined.skyv",
//!       "depth": 5,
//!       "sources": [
//!         { "path": "Raw/Hipparcos.tsv", "ra_column": 2, "ra_format": "deg",
//!           "dec_column": 3, "dec_format": "deg", "mag_column": 0,
//!           "color_column": 1, "color_format": "bv",
//!           "bands": [{ "level": 0, "min_mag": -2, "max_mag": 2 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Catalogs share nothing, so they are built in parallel; the sources of one
//! catalog are ingested in order.

use crate::build::{build_catalog, create_progress_bar, print_summary, IngestStats, SourceSpec};
use crate::cli::{Cli, PlanArgs};
use anyhow::Context;
use indicatif::MultiProgress;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub catalogs: Vec<CatalogPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPlan {
    pub output: PathBuf,
    pub depth: u8,
    pub sources: Vec<SourceSpec>,
}

impl Plan {
    /// Reads a plan; relative paths resolve against the plan's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open plan {:?}", path))?;
        let mut plan: Plan = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse plan {:?}", path))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for catalog in &mut plan.catalogs {
            catalog.output = base.join(&catalog.output);
            for source in &mut catalog.sources {
                source.path = base.join(&source.path);
            }
        }
        Ok(plan)
    }
}

pub fn run(args: &PlanArgs, cli: &Cli) -> anyhow::Result<()> {
    let plan = Plan::load(&args.plan)?;
    configure_thread_pool(args.threads);

    println!("Building {} catalogs from {:?}", plan.catalogs.len(), args.plan);
    let start = Instant::now();
    let bars = MultiProgress::new();

    let results: Vec<anyhow::Result<IngestStats>> = plan
        .catalogs
        .par_iter()
        .map(|entry| -> anyhow::Result<IngestStats> {
            let progress = bars.add(create_progress_bar());
            let (catalog, stats) = build_catalog(entry.depth, &entry.sources, &progress)
                .with_context(|| format!("Failed to build {:?}", entry.output))?;
            progress.finish_and_clear();

            catalog
                .save(&entry.output)
                .with_context(|| format!("Failed to write catalog {:?}", entry.output))?;
            print_summary(&entry.output, &catalog, &stats, cli.verbose);
            Ok(stats)
        })
        .collect();

    let mut total = IngestStats::default();
    let mut failed = 0;
    for result in results {
        match result {
            Ok(stats) => total.merge(&stats),
            Err(e) => {
                tracing::error!("{:#}", e);
                failed += 1;
            }
        }
    }

    println!(
        "Placed {} stars ({} lines skipped) in {:.1} s",
        total.placed,
        total.malformed,
        start.elapsed().as_secs_f64()
    );
    if failed > 0 {
        anyhow::bail!("{} of {} catalogs failed", failed, plan.catalogs.len());
    }
    Ok(())
}

fn configure_thread_pool(threads: usize) {
    let threads = if threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
