//! Plot output: one pretty-printed JSON document per metric.

use std::path::{Path, PathBuf};

use runplot_common::{RunplotError, RunplotResult};
use runplot_run_model::plot::{PlotRenderer, PlotResult};

/// Writes each plot to `<dir>/<safe metric name>.json` for an external
/// rasterizer.
pub struct JsonPlotWriter {
    dir: PathBuf,
}

impl JsonPlotWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, metric: &str) -> PathBuf {
        self.dir.join(format!("{}.json", safe_filename(metric)))
    }
}

impl PlotRenderer for JsonPlotWriter {
    fn render(&mut self, plot: &PlotResult) -> RunplotResult<PathBuf> {
        let path = self.path_for(&plot.metric);
        let json = serde_json::to_string_pretty(plot)?;
        std::fs::write(&path, json).map_err(|e| {
            RunplotError::render(format!("failed to write {}: {e}", path.display()))
        })?;
        tracing::debug!(metric = %plot.metric, path = %path.display(), "Wrote plot");
        Ok(path)
    }
}

/// Make a metric name usable as a file name.
pub fn safe_filename(name: &str) -> String {
    if name.is_empty() {
        return "unnamed".to_string();
    }
    name.replace(['/', '\\'], "_")
}
