//! Per-column statistics for metric discovery.

use std::collections::BTreeMap;

use runplot_run_model::history::{RawSeries, Value};
use serde::{Deserialize, Serialize};

/// Column prefixes reserved for bookkeeping rather than user metrics.
pub const SYSTEM_PREFIXES: [&str; 3] = ["_", "system/", "gradients/"];

/// Minimum width of the metric name column in [`format_metrics_table`].
const MIN_NAME_WIDTH: usize = 25;

pub fn is_system_column(name: &str) -> bool {
    SYSTEM_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Kind of values a column holds, judged over its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    String,
    Boolean,
    /// Nested tables, media, or histograms.
    Object,
    Mixed,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Object => "object",
            ColumnType::Mixed => "mixed",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(v) if v.is_nan() => None,
            Value::Number(_) => Some(ColumnType::Numeric),
            Value::Text(_) => Some(ColumnType::String),
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Other(_) => Some(ColumnType::Object),
        }
    }
}

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Rows in the history.
    pub count: usize,

    /// Rows with a non-null value for this column.
    pub non_null_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Sample standard deviation; needs at least two values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

/// Summarize every column of a run, keyed by column name.
///
/// Columns with no non-null value are omitted, as are system columns unless
/// `include_system` is set.
pub fn summarize_metrics(
    series: &RawSeries,
    include_system: bool,
) -> BTreeMap<String, MetricStats> {
    let mut summary = BTreeMap::new();
    if series.is_empty() {
        tracing::info!(run = %series.label, "Run has no history data");
        return summary;
    }

    for column in series.columns() {
        if !include_system && is_system_column(column) {
            continue;
        }
        if let Some(stats) = summarize_column(series, column) {
            summary.insert(column.to_string(), stats);
        }
    }

    tracing::info!(run = %series.label, metrics = summary.len(), "Summarized metrics");
    summary
}

fn summarize_column(series: &RawSeries, column: &str) -> Option<MetricStats> {
    let mut column_type: Option<ColumnType> = None;
    let mut non_null_count = 0;
    let mut numbers = Vec::new();

    for value in series.column(column).flatten() {
        let Some(kind) = ColumnType::of(value) else {
            continue;
        };
        non_null_count += 1;
        column_type = match column_type {
            None => Some(kind),
            Some(existing) if existing == kind => Some(existing),
            Some(_) => Some(ColumnType::Mixed),
        };
        if let Some(v) = value.as_f64() {
            numbers.push(v);
        }
    }

    let column_type = column_type?;
    let mut stats = MetricStats {
        column_type,
        count: series.len(),
        non_null_count,
        min: None,
        max: None,
        mean: None,
        std: None,
    };

    if column_type == ColumnType::Numeric && !numbers.is_empty() {
        let n = numbers.len() as f64;
        let mean = numbers.iter().sum::<f64>() / n;
        stats.min = numbers.iter().copied().reduce(f64::min);
        stats.max = numbers.iter().copied().reduce(f64::max);
        stats.mean = Some(mean);
        if numbers.len() > 1 {
            let var = numbers.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            stats.std = Some(var.sqrt());
        }
    }

    Some(stats)
}

/// Render statistics as a fixed-width table sorted by name.
pub fn format_metrics_table(metrics: &BTreeMap<String, MetricStats>) -> String {
    if metrics.is_empty() {
        return "No metrics found.".to_string();
    }

    let name_width = metrics
        .keys()
        .map(|name| name.chars().count() + 2)
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);

    let row = |name: &str, kind: &str, count: &str, min: &str, max: &str, mean: &str| {
        format!("{name:<name_width$} {kind:<12} {count:<8} {min:<12} {max:<12} {mean:<12}")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        row("Metric", "Type", "Count", "Min", "Max", "Mean"),
        "-".repeat(name_width + 12 + 8 + 12 + 12 + 12),
    ];

    let na = || "N/A".to_string();
    for (name, stats) in metrics {
        let (min, max) = match (stats.min, stats.max) {
            (Some(min), Some(max)) => (format_g(min), format_g(max)),
            _ => (na(), na()),
        };
        let mean = stats.mean.map(format_g).unwrap_or_else(na);
        lines.push(row(
            name,
            stats.column_type.as_str(),
            &stats.non_null_count.to_string(),
            &min,
            &max,
            &mean,
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total metrics: {}", metrics.len()));

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for stats in metrics.values() {
        *by_type.entry(stats.column_type.as_str()).or_default() += 1;
    }
    let summary = by_type
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("By type: {summary}"));

    lines.join("\n")
}

/// Format with six significant digits, switching to exponent notation for
/// very large or small magnitudes, trailing zeros removed.
pub fn format_g(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{value:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return value.to_string();
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
