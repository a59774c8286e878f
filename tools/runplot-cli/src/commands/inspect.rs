//! Show run history information.

use std::path::PathBuf;

use runplot_processing_core::align::{TimeAligner, XAxisField};
use runplot_processing_core::batch::available_metrics;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let run = super::load_history(&path)?;

    println!("Run: {}", run.label);
    if let Some(ref id) = run.run_id {
        println!("  ID: {id}");
    }
    println!("  File: {}", path.display());
    println!("  Rows: {}", run.len());

    if run.is_empty() {
        println!("\nRun has no history data.");
        return Ok(());
    }

    let x_field = XAxisField::resolve(&run);
    print!("  X-axis: {}", x_field.label());
    if let Some(column) = x_field.column() {
        let xs: Vec<f64> = run.column(column).flatten().filter_map(|v| v.as_f64()).collect();
        let min = xs.iter().copied().reduce(f64::min);
        let max = xs.iter().copied().reduce(f64::max);
        if let (Some(min), Some(max)) = (min, max) {
            print!(" ({min} to {max})");
        }
    }
    println!();
    println!();

    let metrics = available_metrics(std::slice::from_ref(&run));
    println!("Metrics ({}):", metrics.len());
    for metric in &metrics {
        let points = TimeAligner::align(&run, metric)
            .map(|aligned| aligned.points.len())
            .unwrap_or(0);
        println!("  {metric}: {points} valid point(s)");
    }

    Ok(())
}
