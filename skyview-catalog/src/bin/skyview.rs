use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use skyview_catalog::view::{Camera, CatalogFile, SvgStyle, View, ViewParams, DEFAULT_TEMPLATE};
use std::f64::consts::PI;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
    Svg,
}

#[derive(Parser)]
#[command(name = "skyview")]
#[command(about = "Query level-of-detail star catalogs")]
#[command(version)]
struct Cli {
    /// Path to the catalog file
    #[arg(long)]
    catalog: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalog information
    Info,
    /// List the stars visible in a field of view
    View {
        /// Right ascension of the view center in hours
        #[arg(long, allow_hyphen_values = true)]
        ra: f64,
        /// Declination of the view center in degrees
        #[arg(long, allow_hyphen_values = true)]
        dec: f64,
        /// Full field of view in degrees
        #[arg(long, default_value = "60.0")]
        fov: f64,
        /// Rotate the view about its center (degrees)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        roll: f64,
        /// Deepest mesh level to visit
        #[arg(long, default_value = "10")]
        max_level: u8,
        /// Brightness curve softness
        #[arg(long, default_value = "50.0")]
        sensitivity: f64,
        /// Drop stars at or below this weight
        #[arg(long, default_value = "0.1")]
        min_weight: f64,
        /// Maximum number of results (table, json, csv)
        #[arg(long)]
        limit: Option<usize>,
        /// Print query timing
        #[arg(long)]
        timing: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// SVG canvas width
        #[arg(long, default_value = "1080")]
        width: u32,
        /// SVG canvas height
        #[arg(long, default_value = "1080")]
        height: u32,
        /// Circle radius of the faintest stars
        #[arg(long, default_value = "0.5")]
        r_min: f64,
        /// Circle radius of the brightest stars
        #[arg(long, default_value = "4.0")]
        r_max: f64,
        /// SVG template with %W%, %H% and %STAR% placeholders
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let file = CatalogFile::open(&cli.catalog)
                .with_context(|| format!("Failed to open catalog {:?}", cli.catalog))?;
            let size_mb = file.file_size() as f64 / 1_048_576.0;
            println!("{}", file.header());
            println!("File size: {} bytes ({:.2} MB)", file.file_size(), size_mb);

            let catalog = file.decode().context("Failed to decode catalog")?;
            println!("Nodes: {}", catalog.node_count());
            println!("Stars: {}", catalog.star_count());
            for (level, count) in catalog.stars_per_level().iter().enumerate() {
                println!("  level {:2}: {:>10} stars", level, count);
            }
        }
        Commands::View {
            ra,
            dec,
            fov,
            roll,
            max_level,
            sensitivity,
            min_weight,
            limit,
            timing,
            format,
            width,
            height,
            r_min,
            r_max,
            template,
        } => {
            let file = CatalogFile::open(&cli.catalog)
                .with_context(|| format!("Failed to open catalog {:?}", cli.catalog))?;

            let mut camera = Camera::from_ra_dec(ra, dec, fov)?;
            if roll != 0.0 {
                camera.spin(roll / 180.0 * PI, 1.0)?;
            }
            let params = ViewParams {
                max_level,
                sensitivity,
                min_weight,
            };

            let start = if timing { Some(Instant::now()) } else { None };
            let mut view = file.view(&camera, &params)?;
            if let Some(start_time) = start {
                eprintln!(
                    "Query completed in {:.2} ms",
                    start_time.elapsed().as_secs_f64() * 1000.0
                );
            }

            match format {
                OutputFormat::Svg => {
                    let template = match template {
                        Some(path) => std::fs::read_to_string(&path)
                            .with_context(|| format!("Failed to read template {:?}", path))?,
                        None => DEFAULT_TEMPLATE.to_string(),
                    };
                    let style = SvgStyle {
                        width,
                        height,
                        r_min,
                        r_max,
                    };
                    print!("{}", view.to_svg(&template, &style));
                }
                other => {
                    if let Some(limit) = limit {
                        view.stars.truncate(limit);
                    }
                    match other {
                        OutputFormat::Json => print_json(&view)?,
                        OutputFormat::Csv => print_csv(&view),
                        _ => print_table(&view),
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_table(view: &View) {
    for (i, star) in view.stars.iter().enumerate() {
        println!(
            "{:4}: Az={:+8.3}° R={:.4} Weight={:.3} RGB=({:3},{:3},{:3})",
            i + 1,
            star.azimuth.to_degrees(),
            star.radius,
            star.weight,
            star.color.r,
            star.color.g,
            star.color.b
        );
    }

    if view.is_empty() {
        println!("No stars visible in this field.");
    } else {
        println!(
            "\nTotal results: {} (field radius {:.3}°)",
            view.len(),
            view.frame_angle.to_degrees()
        );
    }
}

fn print_json(view: &View) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

fn print_csv(view: &View) {
    println!("azimuth,radius,weight,r,g,b");
    for star in &view.stars {
        println!(
            "{},{},{},{},{},{}",
            star.azimuth, star.radius, star.weight, star.color.r, star.color.g, star.color.b
        );
    }
}
