//! rwcharts - render read/write benchmark results as log-log line charts.
//!
//! Each input file is one benchmark run. Runs are compared cell by cell:
//! one chart per read/write ratio, one line per value size and operation.

mod chart;
mod dataset;
mod error;

use anyhow::{Context, Result};
use chart::{OutputFormat, RenderOptions};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Render read/write benchmark results as a grid of log-log line charts
#[derive(Parser, Debug)]
#[command(name = "rwcharts")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Benchmark result files (.csv from the benchmark script, or .jsonl)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Title shown in the top-left legend
    #[arg(short, long, default_value = "Read/Write benchmark")]
    title: String,

    /// Output image file
    #[arg(short, long, default_value = "readwrite.svg")]
    output: PathBuf,

    /// Output format (svg, png); inferred from the output extension if omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Font family used for all text
    #[arg(long, default_value = "sans-serif")]
    font: String,

    /// Number of chart columns in the grid
    #[arg(long, default_value = "1")]
    columns: usize,

    /// Width of one chart cell in pixels
    #[arg(long, default_value = "1200")]
    cell_width: u32,

    /// Height of one chart cell in pixels
    #[arg(long, default_value = "600")]
    cell_height: u32,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let format = match args.format.as_deref() {
        Some(name) => name.parse::<OutputFormat>()?,
        None => OutputFormat::from_path(&args.output)
            .context("Cannot infer output format; pass --format")?,
    };

    let datasets = args
        .inputs
        .iter()
        .map(|path| {
            dataset::load(path)
                .with_context(|| format!("Failed to load benchmark results: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(datasets = datasets.len(), "loaded benchmark results");

    let opts = RenderOptions {
        font: args.font,
        columns: args.columns,
        cell_width: args.cell_width,
        cell_height: args.cell_height,
    };

    chart::render(&datasets, &args.title, &args.output, format, &opts)
        .with_context(|| format!("Failed to render {}", args.output.display()))?;

    eprintln!("Generated: {}", args.output.display());
    Ok(())
}
