//! List a run's metrics with statistics.

use std::path::PathBuf;

use runplot_processing_core::stats::{format_metrics_table, summarize_metrics};

pub fn run(path: PathBuf, include_system: bool, json: bool) -> anyhow::Result<()> {
    let run = super::load_history(&path)?;
    let summary = summarize_metrics(&run, include_system);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_metrics_table(&summary));
    }

    Ok(())
}
