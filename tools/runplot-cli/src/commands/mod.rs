pub mod inspect;
pub mod metrics;
pub mod plot;

use std::path::Path;

use runplot_run_model::history::RawSeries;

pub(crate) fn load_history(path: &Path) -> anyhow::Result<RawSeries> {
    RawSeries::load(path).map_err(|e| anyhow::anyhow!("Failed to load history: {e}"))
}
