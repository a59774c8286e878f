//! Runplot CLI: command-line interface for plotting run metric histories.
//!
//! Usage:
//!   runplot plot [OPTIONS]       Align, smooth, and scale metrics across runs
//!   runplot metrics <PATH>       List a run's metrics with statistics
//!   runplot inspect <PATH>       Show run history information

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runplot_common::AppConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "runplot",
    about = "Prepare experiment metric histories for plotting",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit structured JSON logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build plot data for one or more metrics across runs
    Plot {
        /// Run history file (JSONL); repeat for multiple runs
        #[arg(short = 'H', long = "history", required = true)]
        histories: Vec<PathBuf>,

        /// Legend label per history, in the same order
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Comma-separated metric names
        #[arg(short, long, value_delimiter = ',', required = true)]
        metrics: Vec<String>,

        /// Rolling-average window size
        #[arg(short, long)]
        smooth: Option<usize>,

        /// EMA weight in (0, 1); ignored when --smooth is above 1
        #[arg(long)]
        ema_weight: Option<f64>,

        /// EMA viewport scale
        #[arg(long)]
        viewport_scale: Option<f64>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite metadata.json instead of merging into it
        #[arg(long)]
        no_merge: bool,
    },

    /// List available metrics for a run
    Metrics {
        /// Path to the run history file
        path: PathBuf,

        /// Include system columns (_step, _timestamp, system/*, gradients/*)
        #[arg(long)]
        include_system: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show run history information
    Inspect {
        /// Path to the run history file
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.json |= cli.log_json;
    runplot_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Plot {
            histories,
            labels,
            metrics,
            smooth,
            ema_weight,
            viewport_scale,
            output,
            no_merge,
        } => commands::plot::run(
            commands::plot::PlotArgs {
                histories,
                labels,
                metrics,
                smooth,
                ema_weight,
                viewport_scale,
                output,
                merge: !no_merge,
            },
            &config,
        ),
        Commands::Metrics {
            path,
            include_system,
            json,
        } => commands::metrics::run(path, include_system, json),
        Commands::Inspect { path } => commands::inspect::run(path),
    }
}
