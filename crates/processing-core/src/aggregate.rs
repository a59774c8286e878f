//! Multi-run aggregation for a single metric.
//!
//! Runs are processed in input order: aligned, smoothed, given a unique
//! label and a palette slot. Palette slots count only the runs that
//! actually contribute points, so skipped runs leave no color gaps.

use std::collections::{HashMap, HashSet};

use runplot_common::{RunplotError, RunplotResult};
use runplot_run_model::history::RawSeries;
use runplot_run_model::plot::{PlotResult, Series, PALETTE};

use crate::align::{TimeAligner, XAxisField};
use crate::axis::AxisScaler;
use crate::smooth::Smoother;

/// Builds one [`PlotResult`] per metric from many runs.
pub struct MultiRunAggregator {
    smoother: Smoother,
}

impl MultiRunAggregator {
    pub fn new(smoother: Smoother) -> Self {
        Self { smoother }
    }

    /// Aggregate `metric` across `runs`.
    ///
    /// Runs without the metric are skipped silently; runs whose metric has
    /// no valid points are skipped with a warning. Fails with
    /// [`RunplotError::NoData`] when no run contributes a point.
    pub fn aggregate(&self, metric: &str, runs: &[RawSeries]) -> RunplotResult<PlotResult> {
        let mut labels = LabelRegistry::default();
        let mut series = Vec::new();
        let mut x_label: Option<&'static str> = None;
        let mut values = Vec::new();

        for run in runs {
            let Some(aligned) = TimeAligner::align(run, metric) else {
                tracing::debug!(run = %run.label, metric, "Metric not logged by run; skipping");
                continue;
            };

            if aligned.points.is_empty() {
                tracing::warn!(run = %run.label, metric, "Run has no valid points; skipping");
                continue;
            }

            if x_label.is_none() && aligned.x_field.is_named() {
                x_label = Some(aligned.x_field.label());
            }

            values.extend(aligned.points.iter().map(|p| p.y));
            let smoothed = self.smoother.smooth(&aligned.points);

            series.push(Series {
                label: labels.claim(&run.label),
                color_index: series.len() % PALETTE.len(),
                points: aligned.points,
                smoothed,
            });
        }

        if series.is_empty() {
            return Err(RunplotError::no_data(metric));
        }

        let x_label = x_label.unwrap_or_else(|| XAxisField::Index.label());
        let axis = AxisScaler::axis_spec(metric, x_label, &values);

        Ok(PlotResult {
            metric: metric.to_string(),
            title: format!("{metric} over time"),
            series,
            axis,
            smoothing: self.smoother.algorithm(),
        })
    }
}

/// Hands out unique series labels: the first "baseline" stays as is, later
/// ones become "baseline (2)", "baseline (3)", ...
#[derive(Debug, Default)]
struct LabelRegistry {
    used: HashSet<String>,
    occurrences: HashMap<String, usize>,
}

impl LabelRegistry {
    fn claim(&mut self, base: &str) -> String {
        let count = self.occurrences.entry(base.to_string()).or_insert(0);
        *count += 1;

        let mut candidate = if *count == 1 {
            base.to_string()
        } else {
            format!("{base} ({count})")
        };
        while self.used.contains(&candidate) {
            *count += 1;
            candidate = format!("{base} ({count})");
        }

        self.used.insert(candidate.clone());
        candidate
    }
}
