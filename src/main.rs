//! TPL - analytic placement of Bookshelf benchmarks
//!
//! Loads `<BENCHMARK>.nodes`, `.pl` and `.nets`, runs bound-to-bound
//! quadratic placement rounds and writes the result as `<name>.pl`.
//!
//! # Usage
//!
//! ```bash
//! tpl benchmarks/adaptec1 --config tpl.json --rounds 5 --output-dir out -vv
//! ```

use std::path::PathBuf;

use clap::Parser;
use tpl_core::{
    bookshelf,
    circuit::validate_circuit,
    error::Result,
    PlacerConfig, Placer,
};
use tracing::{info, warn};

/// Quadratic placer for Bookshelf benchmarks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Benchmark path without extension (e.g. benchmarks/adaptec1)
    #[arg(value_name = "BENCHMARK")]
    benchmark: PathBuf,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of placement rounds (overrides the configuration)
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Directory for placement snapshots
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Do not write any placement snapshot
    #[arg(long)]
    no_snapshot: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => PlacerConfig::from_file(path)?,
        None => PlacerConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config = config.with_rounds(rounds);
        config.validate()?;
    }

    // Load the benchmark
    let circuit = bookshelf::load_benchmark(&args.benchmark)?;

    // Unanchored modules usually make the solve fail; report and carry on
    if let Err(e) = validate_circuit(&circuit) {
        warn!("{}", e);
    }

    let mut placer = Placer::with_config(circuit, config);
    let output_dir = (!args.no_snapshot).then_some(args.output_dir.as_path());
    let reports = placer.run(output_dir)?;

    if let (Some(first), Some(last)) = (reports.first(), reports.last()) {
        info!(
            rounds = reports.len(),
            initial = first.hpwl_before,
            final_hpwl = last.hpwl_after,
            "placement finished"
        );
    }

    Ok(())
}
