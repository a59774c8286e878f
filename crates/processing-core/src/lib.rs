//! Runplot Processing Core
//!
//! Turns raw run histories into drawable plots:
//! - **Alignment:** Pick each run's x-axis and extract valid (x, y) points
//! - **Smoothing:** Trailing rolling mean or debiased time-weighted EMA
//! - **Axis Scaling:** Log scale for wide losses, fixed range for accuracies
//! - **Aggregation:** One plot per metric across many runs, with stable colors
//! - **Batches:** Multi-metric requests with per-metric failure collection
//! - **Statistics:** Column summaries for metric discovery
//!
//! This crate is pure computation with no I/O.
//! All inputs are data; all outputs are data.

pub mod aggregate;
pub mod align;
pub mod axis;
pub mod batch;
pub mod smooth;
pub mod stats;

pub use aggregate::MultiRunAggregator;
pub use align::TimeAligner;
pub use axis::AxisScaler;
pub use batch::{BatchReport, PlotBatch};
pub use smooth::Smoother;
