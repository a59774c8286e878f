//! Drawable plot data handed to a renderer.
//!
//! A [`PlotResult`] is the terminal artifact of the processing core: one
//! metric, its labeled series, and the axis decisions made across them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use runplot_common::RunplotResult;
use serde::{Deserialize, Serialize};

use crate::smoothing::SmoothingAlgorithm;

/// Series colors, cycled by contributing-run position.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// One aligned sample. Samples with a missing y never become points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub x: f64,
    pub y: f64,
}

impl AlignedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One run's drawable line (plus its smoothed counterpart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Legend label, unique within a plot.
    pub label: String,

    /// Index into [`PALETTE`] (already wrapped).
    pub color_index: usize,

    /// Raw aligned points, drawn faint when a smoothed line exists.
    pub points: Vec<AlignedPoint>,

    /// Smoothed points at the same x positions, when smoothing is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothed: Option<Vec<AlignedPoint>>,
}

/// Y-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum YScale {
    #[default]
    Linear,
    Log,
}

/// Axis configuration computed once per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub x_label: String,
    pub y_label: String,
    pub y_scale: YScale,

    /// Fixed y-range; `None` means auto-ranged.
    #[serde(default)]
    pub y_limits: Option<(f64, f64)>,
}

/// Everything a renderer needs to draw one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    pub metric: String,
    pub title: String,
    pub series: Vec<Series>,
    pub axis: AxisSpec,
    pub smoothing: SmoothingAlgorithm,
}

impl PlotResult {
    /// Number of plotted points per series label.
    pub fn point_counts(&self) -> BTreeMap<String, usize> {
        self.series
            .iter()
            .map(|s| (s.label.clone(), s.points.len()))
            .collect()
    }

    pub fn total_points(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Consumer of finished plots (image backends, JSON dumps, ...).
pub trait PlotRenderer {
    /// Render one plot and return where it was written.
    fn render(&mut self, plot: &PlotResult) -> RunplotResult<PathBuf>;
}
