use std::path::PathBuf;

use runplot_common::RunplotError;
use runplot_processing_core::align::XAxisField;
use runplot_processing_core::axis::UNIT_RANGE_LIMITS;
use runplot_processing_core::smooth::successive_variance;
use runplot_processing_core::stats::{summarize_metrics, ColumnType};
use runplot_processing_core::{MultiRunAggregator, PlotBatch, Smoother, TimeAligner};
use runplot_run_model::history::{RawSeries, Value};
use runplot_run_model::plot::YScale;
use runplot_run_model::smoothing::SmoothingConfig;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-run")
        .join("history.jsonl")
}

fn load_fixture_run() -> RawSeries {
    RawSeries::load(fixture_path()).expect("fixture history should load")
}

fn metrics(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn fixture_header_and_schema() {
    let run = load_fixture_run();
    assert_eq!(run.label, "sample-run");
    assert_eq!(run.run_id.as_deref(), Some("7f3k2q9d"));
    assert_eq!(run.len(), 100);

    let aligned = TimeAligner::align(&run, "loss").unwrap();
    assert_eq!(aligned.x_field, XAxisField::Step);
    assert_eq!(aligned.points.len(), 100);
    assert_eq!(aligned.points[99].x, 99.0);
}

#[test]
fn ema_smoothing_golden_values() {
    let run = load_fixture_run();
    let smoother = Smoother::from_config(&SmoothingConfig::ema(0.99, 1000.0));
    let plot = MultiRunAggregator::new(smoother)
        .aggregate("loss", std::slice::from_ref(&run))
        .unwrap();

    let series = &plot.series[0];
    let smoothed = series.smoothed.as_ref().unwrap();
    assert_eq!(smoothed.len(), series.points.len());

    assert_close(smoothed[0].y, 2.51);
    assert_close(smoothed[1].y, 2.490793967298347);
    assert_close(smoothed[10].y, 1.982257541755579);
    assert_close(smoothed[50].y, 0.586936895439949);
    assert_close(smoothed[99].y, 0.15260293527510754);
}

#[test]
fn ema_smoothing_is_smoother_and_keeps_trend() {
    let run = load_fixture_run();
    let smoother = Smoother::from_config(&SmoothingConfig::ema(0.99, 1000.0));
    let plot = MultiRunAggregator::new(smoother)
        .aggregate("loss", std::slice::from_ref(&run))
        .unwrap();

    let raw: Vec<f64> = plot.series[0].points.iter().map(|p| p.y).collect();
    let smoothed: Vec<f64> = plot.series[0]
        .smoothed
        .as_ref()
        .unwrap()
        .iter()
        .map(|p| p.y)
        .collect();

    assert!(successive_variance(&smoothed) < successive_variance(&raw));

    let head = smoothed[..10].iter().sum::<f64>() / 10.0;
    let tail = smoothed[90..].iter().sum::<f64>() / 10.0;
    assert!(tail < head);
}

#[test]
fn rolling_smoothing_golden_values() {
    let run = load_fixture_run();
    let smoother = Smoother::from_config(&SmoothingConfig::rolling(10));
    let plot = MultiRunAggregator::new(smoother)
        .aggregate("loss", std::slice::from_ref(&run))
        .unwrap();

    let smoothed = plot.series[0].smoothed.as_ref().unwrap();
    assert_close(smoothed[4].y, 2.3123754);
    assert_close(smoothed[50].y, 0.4777019);
    assert_close(smoothed[99].y, 0.1332545);
    assert_eq!(plot.smoothing.legend_label().unwrap(), "Smoothed (window=10)");
}

#[test]
fn fixture_axis_decisions() {
    let run = load_fixture_run();
    let runs = vec![run];
    let batch = PlotBatch::new(&runs, SmoothingConfig::none()).unwrap();
    let report = batch.run(&metrics(&["loss", "accuracy"])).unwrap();
    let plots: Vec<_> = report.plots().collect();

    assert_eq!(plots.len(), 2);
    assert_eq!(plots[0].axis.y_scale, YScale::Log);
    assert_eq!(plots[0].axis.x_label, "Step");
    assert_eq!(plots[1].axis.y_scale, YScale::Linear);
    assert_eq!(plots[1].axis.y_limits, Some(UNIT_RANGE_LIMITS));
    assert!(plots.iter().all(|p| p.series[0].smoothed.is_none()));
}

#[test]
fn unknown_metric_fails_whole_batch() {
    let runs = vec![load_fixture_run()];
    let batch = PlotBatch::new(&runs, SmoothingConfig::rolling(5)).unwrap();
    let err = batch
        .run(&metrics(&["loss", "ghost_metric"]))
        .unwrap_err();

    match &err {
        RunplotError::MetricNotFound { missing, available } => {
            assert_eq!(missing, &metrics(&["ghost_metric"]));
            assert_eq!(available, &metrics(&["accuracy", "loss"]));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Available metrics: accuracy, loss"));
}

#[test]
fn runs_without_metric_leave_no_color_gap() {
    let first = load_fixture_run();

    let mut accuracy_only = load_fixture_run();
    accuracy_only.label = "accuracy-only".to_string();
    for row in &mut accuracy_only.rows {
        row.remove("loss");
    }

    let mut third = load_fixture_run();
    third.label = "sample-run".to_string();
    for row in &mut third.rows {
        if let Some(Value::Number(v)) = row.get_mut("loss") {
            *v *= 1.5;
        }
    }

    let runs = vec![first, accuracy_only, third];
    let batch = PlotBatch::new(&runs, SmoothingConfig::ema(0.6, 1000.0)).unwrap();
    let report = batch.run(&metrics(&["loss"])).unwrap();
    let plot = report.plots().next().unwrap();

    let summary: Vec<(&str, usize)> = plot
        .series
        .iter()
        .map(|s| (s.label.as_str(), s.color_index))
        .collect();
    assert_eq!(summary, vec![("sample-run", 0), ("sample-run (2)", 1)]);

    let manifest = report.manifest(&runs);
    assert_eq!(manifest.data_points, 300);
    assert_eq!(manifest.point_counts["loss"]["sample-run (2)"], 100);
    assert_eq!(manifest.run_ids.len(), 3);
}

#[test]
fn fixture_metric_statistics() {
    let summary = summarize_metrics(&load_fixture_run(), false);
    assert_eq!(summary.len(), 2);

    let accuracy = &summary["accuracy"];
    assert_eq!(accuracy.column_type, ColumnType::Numeric);
    assert_eq!(accuracy.count, 100);
    assert_eq!(accuracy.min, Some(0.1));
    assert_eq!(accuracy.max, Some(0.980472));
    assert_close(accuracy.mean.unwrap(), 0.76103155);
    assert_close(accuracy.std.unwrap(), 0.22035002576210677);
}
