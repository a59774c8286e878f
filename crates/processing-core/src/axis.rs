//! Y-axis scaling heuristics.
//!
//! Decisions are made from the metric name and the combined raw values of
//! every contributing series:
//! - **loss** metrics spanning more than one order of magnitude get a log scale
//! - **accuracy** metrics inside `[0, 1]` get a fixed, lightly padded range
//! - everything else is linear and auto-ranged

use runplot_run_model::plot::{AxisSpec, YScale};

/// Max/min ratio above which a loss metric switches to a log scale.
pub const LOG_SPAN_RATIO: f64 = 10.0;

/// Y-range used for accuracy-like metrics inside `[0, 1]`.
pub const UNIT_RANGE_LIMITS: (f64, f64) = (-0.05, 1.05);

/// Y-axis decision for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YAxisDecision {
    pub scale: YScale,
    pub limits: Option<(f64, f64)>,
}

/// Stateless axis heuristics.
pub struct AxisScaler;

impl AxisScaler {
    /// Decide scale and limits for `metric` given all of its plotted values.
    pub fn decide(metric: &str, values: &[f64]) -> YAxisDecision {
        let name = metric.to_lowercase();
        let mut decision = YAxisDecision {
            scale: YScale::Linear,
            limits: None,
        };

        if name.contains("loss") {
            if let Some((min, max)) = min_max(values.iter().copied().filter(|v| *v > 0.0)) {
                if min > 0.0 && max / min > LOG_SPAN_RATIO {
                    decision.scale = YScale::Log;
                }
            }
        } else if name.contains("acc") {
            if let Some((min, max)) = min_max(values.iter().copied()) {
                if min >= 0.0 && max <= 1.0 {
                    decision.limits = Some(UNIT_RANGE_LIMITS);
                }
            }
        }

        decision
    }

    /// Build the full axis spec, annotating the y label on log scales.
    pub fn axis_spec(metric: &str, x_label: &str, values: &[f64]) -> AxisSpec {
        let decision = Self::decide(metric, values);
        let y_label = match decision.scale {
            YScale::Log => format!("{metric} (log scale)"),
            YScale::Linear => metric.to_string(),
        };

        AxisSpec {
            x_label: x_label.to_string(),
            y_label,
            y_scale: decision.scale,
            y_limits: decision.limits,
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
