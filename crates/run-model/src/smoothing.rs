//! Smoothing settings for a plot request.

use runplot_common::{RunplotError, RunplotResult, DEFAULT_VIEWPORT_SCALE};
use serde::{Deserialize, Serialize};

/// Smoothing settings as supplied by the caller.
///
/// Both a rolling window and an EMA weight may be present; [`Self::algorithm`]
/// resolves which one applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Rolling-mean window. Values below 2 leave rolling smoothing off.
    pub window: Option<usize>,

    /// EMA weight, exclusive range (0, 1).
    pub ema_weight: Option<f64>,

    /// Normalization constant for the time-weighted EMA decay.
    pub viewport_scale: f64,
}

/// The single smoothing algorithm applied to every series of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SmoothingAlgorithm {
    /// Trailing arithmetic mean over `window` samples.
    Rolling { window: usize },

    /// Debiased time-weighted exponential moving average.
    Ema { weight: f64, viewport_scale: f64 },

    /// Raw series drawn unmodified.
    None,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self::none()
    }
}

impl SmoothingConfig {
    pub fn none() -> Self {
        Self {
            window: None,
            ema_weight: None,
            viewport_scale: DEFAULT_VIEWPORT_SCALE,
        }
    }

    pub fn rolling(window: usize) -> Self {
        Self {
            window: Some(window),
            ..Self::none()
        }
    }

    pub fn ema(weight: f64, viewport_scale: f64) -> Self {
        Self {
            window: None,
            ema_weight: Some(weight),
            viewport_scale,
        }
    }

    /// Reject settings that cannot be applied. Runs before any processing.
    pub fn validate(&self) -> RunplotResult<()> {
        if self.window == Some(0) {
            return Err(RunplotError::config("smoothing window must be at least 1"));
        }

        if let Some(weight) = self.ema_weight {
            if !(weight > 0.0 && weight < 1.0) {
                return Err(RunplotError::config(format!(
                    "EMA weight must be in (0, 1), got {weight}"
                )));
            }
        }

        if !(self.viewport_scale.is_finite() && self.viewport_scale > 0.0) {
            return Err(RunplotError::config(format!(
                "viewport scale must be positive, got {}",
                self.viewport_scale
            )));
        }

        Ok(())
    }

    /// Resolve the active algorithm: an explicit rolling window wins, then
    /// EMA, then no smoothing.
    pub fn algorithm(&self) -> SmoothingAlgorithm {
        match (self.window, self.ema_weight) {
            (Some(window), _) if window > 1 => SmoothingAlgorithm::Rolling { window },
            (_, Some(weight)) => SmoothingAlgorithm::Ema {
                weight,
                viewport_scale: self.viewport_scale,
            },
            _ => SmoothingAlgorithm::None,
        }
    }
}

impl SmoothingAlgorithm {
    /// Legend text for the smoothed line.
    pub fn legend_label(&self) -> Option<String> {
        match self {
            SmoothingAlgorithm::Rolling { window } => Some(format!("Smoothed (window={window})")),
            SmoothingAlgorithm::Ema { weight, .. } => {
                Some(format!("Smoothed (EMA weight={weight})"))
            }
            SmoothingAlgorithm::None => None,
        }
    }
}
