//! Multi-metric plot batches.
//!
//! A batch validates everything that can be validated up front (smoothing
//! settings, empty histories, unknown metrics) and fails fast on those.
//! After that, each metric is processed to completion before the next one
//! starts, and per-metric failures are collected instead of aborting.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use runplot_common::{RunplotError, RunplotResult};
use runplot_run_model::history::RawSeries;
use runplot_run_model::manifest::PlotManifest;
use runplot_run_model::plot::{PlotRenderer, PlotResult};
use runplot_run_model::smoothing::SmoothingConfig;

use crate::aggregate::MultiRunAggregator;
use crate::smooth::Smoother;
use crate::stats::is_system_column;

/// Result of processing a single metric.
#[derive(Debug)]
pub struct MetricOutcome {
    pub metric: String,
    pub result: RunplotResult<PlotResult>,

    /// Where the renderer wrote the plot, when one was used.
    pub output: Option<PathBuf>,
}

/// Everything a batch produced, successes and failures alike.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<MetricOutcome>,
    pub smoothing: SmoothingConfig,
}

impl BatchReport {
    /// Successfully produced plots, in request order.
    pub fn plots(&self) -> impl Iterator<Item = &PlotResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed metrics with their reasons, in request order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &RunplotError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.metric.as_str(), e)))
    }

    pub fn plot_count(&self) -> usize {
        self.plots().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Summarize the batch for persistence next to the generated plots.
    pub fn manifest(&self, runs: &[RawSeries]) -> PlotManifest {
        let plots_generated = self
            .outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .filter_map(|o| o.output.as_ref())
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        let failures = self
            .failures()
            .map(|(metric, err)| (metric.to_string(), err.to_string()))
            .collect();

        PlotManifest {
            run_ids: runs
                .iter()
                .map(|r| r.run_id.clone().unwrap_or_else(|| r.label.clone()))
                .collect(),
            run_labels: runs.iter().map(|r| r.label.clone()).collect(),
            generation_timestamp: PlotManifest::now_timestamp(),
            smoothing: self.smoothing.algorithm(),
            smoothing_window: self.smoothing.window,
            metrics_plotted: self.outcomes.iter().map(|o| o.metric.clone()).collect(),
            plots_generated,
            plot_count: self.plot_count(),
            data_points: runs.iter().map(RawSeries::len).sum(),
            point_counts: point_counts(self),
            failures,
        }
    }
}

/// A validated plot request over a fixed set of runs.
pub struct PlotBatch<'a> {
    runs: &'a [RawSeries],
    smoothing: SmoothingConfig,
    aggregator: MultiRunAggregator,
}

impl<'a> PlotBatch<'a> {
    /// Validate the smoothing settings and run histories.
    pub fn new(runs: &'a [RawSeries], smoothing: SmoothingConfig) -> RunplotResult<Self> {
        smoothing.validate()?;

        if runs.is_empty() {
            return Err(RunplotError::config("at least one run history is required"));
        }

        for run in runs.iter().filter(|r| r.is_empty()) {
            tracing::warn!(run = %run.label, "Run has no history data");
        }
        if runs.iter().all(RawSeries::is_empty) {
            let labels = runs
                .iter()
                .map(|r| r.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RunplotError::empty_history(labels));
        }

        Ok(Self {
            runs,
            smoothing,
            aggregator: MultiRunAggregator::new(Smoother::from_config(&smoothing)),
        })
    }

    /// Deduplicate `metrics` and check each exists in at least one run.
    /// Performs no aggregation and produces no output.
    pub fn validate(&self, metrics: &[String]) -> RunplotResult<Vec<String>> {
        let metrics = dedupe(metrics);
        if metrics.is_empty() {
            return Err(RunplotError::config("no metrics specified"));
        }
        validate_metrics(&metrics, self.runs)?;
        Ok(metrics)
    }

    /// Produce plots for `metrics` without rendering them.
    pub fn run(&self, metrics: &[String]) -> RunplotResult<BatchReport> {
        self.execute(metrics, None)
    }

    /// Produce plots for `metrics`, handing each to `renderer` as soon as it
    /// is built. Render failures count as per-metric failures.
    pub fn run_with_renderer(
        &self,
        metrics: &[String],
        renderer: &mut dyn PlotRenderer,
    ) -> RunplotResult<BatchReport> {
        self.execute(metrics, Some(renderer))
    }

    fn execute(
        &self,
        metrics: &[String],
        mut renderer: Option<&mut dyn PlotRenderer>,
    ) -> RunplotResult<BatchReport> {
        let metrics = self.validate(metrics)?;

        let mut outcomes = Vec::with_capacity(metrics.len());
        for metric in metrics {
            let mut output = None;
            let result = self
                .aggregator
                .aggregate(&metric, self.runs)
                .and_then(|plot| match renderer.as_deref_mut() {
                    Some(renderer) => {
                        output = Some(renderer.render(&plot)?);
                        Ok(plot)
                    }
                    None => Ok(plot),
                });

            match &result {
                Ok(plot) => tracing::info!(
                    metric = %metric,
                    series = plot.series.len(),
                    points = plot.total_points(),
                    "Generated plot"
                ),
                Err(e) => tracing::warn!(metric = %metric, "Failed to generate plot: {e}"),
            }

            outcomes.push(MetricOutcome {
                metric,
                result,
                output,
            });
        }

        Ok(BatchReport {
            outcomes,
            smoothing: self.smoothing,
        })
    }
}

/// Check every requested metric exists in at least one run.
pub fn validate_metrics(metrics: &[String], runs: &[RawSeries]) -> RunplotResult<()> {
    let missing: Vec<String> = metrics
        .iter()
        .filter(|m| !runs.iter().any(|r| r.has_column(m)))
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(RunplotError::MetricNotFound {
        missing,
        available: available_metrics(runs),
    })
}

/// Sorted union of non-system columns across runs.
pub fn available_metrics(runs: &[RawSeries]) -> Vec<String> {
    runs.iter()
        .flat_map(|r| r.columns())
        .filter(|c| !is_system_column(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Point counts per metric, per run label, for successful plots.
pub fn point_counts(report: &BatchReport) -> BTreeMap<String, BTreeMap<String, usize>> {
    report
        .plots()
        .map(|p| (p.metric.clone(), p.point_counts()))
        .collect()
}

/// Drop empty and repeated names, keeping first-seen order. Names are
/// matched exactly; surrounding whitespace is part of a column name.
fn dedupe(metrics: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    metrics
        .iter()
        .filter(|m| !m.is_empty())
        .filter(|m| seen.insert(m.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use runplot_run_model::history::Value;

    fn metrics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn runs() -> Vec<RawSeries> {
        vec![
            RawSeries::from_numeric_columns(
                "a",
                &[
                    ("_step", vec![0.0, 1.0, 2.0]),
                    ("loss", vec![1.0, 0.5, 0.25]),
                    ("accuracy", vec![0.2, 0.5, 0.9]),
                ],
            ),
            RawSeries::from_numeric_columns(
                "b",
                &[("_step", vec![0.0, 1.0]), ("loss", vec![2.0, 1.0])],
            ),
        ]
    }

    struct RecordingRenderer {
        rendered: Vec<String>,
        fail_on: Option<String>,
    }

    impl PlotRenderer for RecordingRenderer {
        fn render(&mut self, plot: &PlotResult) -> RunplotResult<PathBuf> {
            if self.fail_on.as_deref() == Some(plot.metric.as_str()) {
                return Err(RunplotError::render("disk full"));
            }
            self.rendered.push(plot.metric.clone());
            Ok(PathBuf::from(format!("/out/{}.json", plot.metric)))
        }
    }

    #[test]
    fn test_unknown_metric_fails_before_any_plot() {
        let runs = runs();
        let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();
        let mut renderer = RecordingRenderer {
            rendered: vec![],
            fail_on: None,
        };

        let err = batch
            .run_with_renderer(&metrics(&["loss", "ghost_metric"]), &mut renderer)
            .unwrap_err();

        match err {
            RunplotError::MetricNotFound { missing, available } => {
                assert_eq!(missing, vec!["ghost_metric".to_string()]);
                assert_eq!(available, vec!["accuracy".to_string(), "loss".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(renderer.rendered.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let runs = runs();
        let err = PlotBatch::new(&runs, SmoothingConfig::ema(1.0, 1000.0))
            .err()
            .unwrap();
        assert!(matches!(err, RunplotError::Config { .. }));
    }

    #[test]
    fn test_all_empty_histories_rejected() {
        let runs = vec![RawSeries::new("a", vec![]), RawSeries::new("b", vec![])];
        let err = PlotBatch::new(&runs, SmoothingConfig::none()).err().unwrap();
        assert!(matches!(err, RunplotError::EmptyHistory { ref label } if label == "a, b"));
    }

    #[test]
    fn test_per_metric_failure_does_not_abort_batch() {
        let mut runs = runs();
        for row in &mut runs[0].rows {
            row.insert("val_loss".to_string(), Value::Null);
        }

        let batch = PlotBatch::new(&runs, SmoothingConfig::rolling(2)).unwrap();
        let report = batch
            .run(&metrics(&["loss", "val_loss", "accuracy"]))
            .unwrap();

        assert_eq!(report.plot_count(), 2);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "val_loss");
        assert!(matches!(failures[0].1, RunplotError::NoData { .. }));
    }

    #[test]
    fn test_render_failure_is_per_metric() {
        let runs = runs();
        let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();
        let mut renderer = RecordingRenderer {
            rendered: vec![],
            fail_on: Some("loss".to_string()),
        };

        let report = batch
            .run_with_renderer(&metrics(&["loss", "accuracy"]), &mut renderer)
            .unwrap();

        assert_eq!(renderer.rendered, vec!["accuracy".to_string()]);
        assert_eq!(report.plot_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_duplicate_and_empty_metrics_are_collapsed() {
        let runs = runs();
        let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();
        let report = batch.run(&metrics(&["loss", "loss", "", "accuracy"])).unwrap();
        let names: Vec<&str> = report.outcomes.iter().map(|o| o.metric.as_str()).collect();
        assert_eq!(names, vec!["loss", "accuracy"]);

        let err = batch.run(&metrics(&[""])).unwrap_err();
        assert!(matches!(err, RunplotError::Config { .. }));
    }

    #[test]
    fn test_metric_names_match_exactly() {
        let runs = vec![RawSeries::from_numeric_columns(
            "a",
            &[(" padded loss ", vec![1.0, 0.5])],
        )];
        let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();

        let report = batch.run(&metrics(&[" padded loss "])).unwrap();
        assert_eq!(report.plot_count(), 1);

        let err = batch.run(&metrics(&["padded loss"])).unwrap_err();
        assert!(matches!(err, RunplotError::MetricNotFound { .. }));
    }

    #[test]
    fn test_validate_dedupes_without_producing_plots() {
        let runs = runs();
        let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();
        assert_eq!(
            batch.validate(&metrics(&["accuracy", "loss", "accuracy"])).unwrap(),
            metrics(&["accuracy", "loss"])
        );

        match batch.validate(&metrics(&["ghost_metric"])).unwrap_err() {
            RunplotError::MetricNotFound { missing, .. } => {
                assert_eq!(missing, metrics(&["ghost_metric"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_manifest_summarizes_batch() {
        let runs = runs();
        let batch = PlotBatch::new(&runs, SmoothingConfig::rolling(3)).unwrap();
        let mut renderer = RecordingRenderer {
            rendered: vec![],
            fail_on: None,
        };
        let report = batch
            .run_with_renderer(&metrics(&["loss", "accuracy"]), &mut renderer)
            .unwrap();
        let manifest = report.manifest(&runs);

        assert_eq!(manifest.run_labels, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(manifest.run_ids, manifest.run_labels);
        assert_eq!(manifest.plots_generated, vec!["loss.json", "accuracy.json"]);
        assert_eq!(manifest.plot_count, 2);
        assert_eq!(manifest.data_points, 5);
        assert_eq!(manifest.smoothing_window, Some(3));
        assert_eq!(manifest.point_counts["loss"]["a"], 3);
        assert_eq!(manifest.point_counts["loss"]["b"], 2);
        assert_eq!(manifest.point_counts["accuracy"].len(), 1);
        assert_eq!(point_counts(&report), manifest.point_counts);
        assert!(manifest.failures.is_empty());
    }
}
