//! Build plot data for metrics across runs.

use std::path::PathBuf;

use runplot_common::{AppConfig, SmoothingDefaults};
use runplot_processing_core::PlotBatch;
use runplot_run_model::manifest::write_metadata_json;
use runplot_run_model::smoothing::SmoothingConfig;

use crate::output::JsonPlotWriter;

pub struct PlotArgs {
    pub histories: Vec<PathBuf>,
    pub labels: Vec<String>,
    pub metrics: Vec<String>,
    pub smooth: Option<usize>,
    pub ema_weight: Option<f64>,
    pub viewport_scale: Option<f64>,
    pub output: Option<PathBuf>,
    pub merge: bool,
}

pub fn run(args: PlotArgs, config: &AppConfig) -> anyhow::Result<()> {
    if !args.labels.is_empty() && args.labels.len() != args.histories.len() {
        anyhow::bail!(
            "Got {} label(s) for {} history file(s)",
            args.labels.len(),
            args.histories.len()
        );
    }

    let mut runs = Vec::with_capacity(args.histories.len());
    for (idx, path) in args.histories.iter().enumerate() {
        let mut run = super::load_history(path)?;
        if let Some(label) = args.labels.get(idx) {
            run.label = label.clone();
        }
        println!("Loaded {} ({} rows) from {}", run.label, run.len(), path.display());
        runs.push(run);
    }

    let smoothing = resolve_smoothing(&args, &config.smoothing);
    if let Some(legend) = smoothing.algorithm().legend_label() {
        println!("Smoothing: {legend}");
    }

    let batch = PlotBatch::new(&runs, smoothing)?;
    let metrics = batch.validate(&split_metric_names(&args.metrics))?;

    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create output directory {}: {e}", output_dir.display())
    })?;

    let mut writer = JsonPlotWriter::new(&output_dir);
    let report = batch.run_with_renderer(&metrics, &mut writer)?;

    for outcome in &report.outcomes {
        match (&outcome.result, &outcome.output) {
            (Ok(_), Some(path)) => println!("  Saved: {}", path.display()),
            (Ok(_), None) => println!("  Built: {}", outcome.metric),
            (Err(e), _) => println!("  Failed: {}: {e}", outcome.metric),
        }
    }

    if report.plot_count() == 0 {
        anyhow::bail!("No plots were generated");
    }

    let manifest = report.manifest(&runs);
    let metadata_path = write_metadata_json(&output_dir, &manifest, args.merge)
        .map_err(|e| anyhow::anyhow!("Failed to write metadata: {e}"))?;
    println!("  Metadata: {}", metadata_path.display());

    println!(
        "\nGenerated {} of {} plot(s) in {}",
        report.plot_count(),
        report.outcomes.len(),
        output_dir.display()
    );
    if report.has_failures() {
        tracing::warn!("Some metrics could not be plotted");
    }

    Ok(())
}

/// Names arrive from a comma-separated flag, so spaces around commas are
/// separators rather than part of the name.
fn split_metric_names(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Command-line smoothing flags replace the configured defaults as a whole;
/// the viewport scale falls back independently.
fn resolve_smoothing(args: &PlotArgs, defaults: &SmoothingDefaults) -> SmoothingConfig {
    let (window, ema_weight) = if args.smooth.is_some() || args.ema_weight.is_some() {
        (args.smooth, args.ema_weight)
    } else {
        (defaults.window, defaults.ema_weight)
    };

    SmoothingConfig {
        window,
        ema_weight,
        viewport_scale: args.viewport_scale.unwrap_or(defaults.viewport_scale),
    }
}
