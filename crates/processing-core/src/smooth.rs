//! Metric smoothing algorithms.
//!
//! Produces a smoothed counterpart for an aligned series. The raw series is
//! always kept alongside so renderers can draw a faint raw line under the
//! smoothed one.

use runplot_run_model::plot::AlignedPoint;
use runplot_run_model::smoothing::{SmoothingAlgorithm, SmoothingConfig};

/// Smoothing engine applying one algorithm to every series it sees.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    algorithm: SmoothingAlgorithm,
}

impl Smoother {
    /// Create a smoother with the given algorithm.
    pub fn new(algorithm: SmoothingAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Create a smoother from (already validated) request settings.
    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(config.algorithm())
    }

    pub fn algorithm(&self) -> SmoothingAlgorithm {
        self.algorithm
    }

    /// Smooth aligned points. Returns `None` when smoothing is off.
    ///
    /// The output has the same length and x values as the input.
    pub fn smooth(&self, points: &[AlignedPoint]) -> Option<Vec<AlignedPoint>> {
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

        let smoothed = match self.algorithm {
            SmoothingAlgorithm::Rolling { window } => rolling_mean(&ys, window),
            SmoothingAlgorithm::Ema {
                weight,
                viewport_scale,
            } => {
                let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
                debiased_ema(&xs, &ys, weight, viewport_scale)
            }
            SmoothingAlgorithm::None => return None,
        };

        Some(
            points
                .iter()
                .zip(smoothed)
                .map(|(p, y)| AlignedPoint::new(p.x, y))
                .collect(),
        )
    }
}

/// Trailing rolling mean with a minimum period of one.
///
/// Element `i` is the mean of `values[max(0, i - window + 1)..=i]`, so early
/// points average over a shrinking window. A window of 0 or 1 returns the
/// input unchanged.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Debiased, time-weighted exponential moving average.
///
/// Decay per step is `weight ^ ((dx / range_of_x) * viewport_scale)`, so
/// irregularly spaced samples decay by elapsed x-distance rather than by
/// sample count. A running debias weight normalizes the warm-up period.
/// The first sample uses its own x as the previous x (zero delta).
///
/// `xs` and `ys` must have the same length.
pub fn debiased_ema(xs: &[f64], ys: &[f64], weight: f64, viewport_scale: f64) -> Vec<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let Some(&first_x) = xs.first() else {
        return vec![];
    };

    let (min_x, max_x) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let mut range_of_x = max_x - min_x;
    if !(range_of_x > 0.0) {
        range_of_x = 1.0;
    }

    let mut last_y = 0.0;
    let mut debias_weight = 0.0;
    let mut prev_x = first_x;

    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let change_in_x = ((x - prev_x) / range_of_x) * viewport_scale;
            let decay = weight.powf(change_in_x);
            last_y = last_y * decay + y;
            debias_weight = debias_weight * decay + 1.0;
            prev_x = x;
            last_y / debias_weight
        })
        .collect()
}

/// Mean squared difference between consecutive values; a roughness measure.
pub fn successive_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    sum / (values.len() - 1) as f64
}
