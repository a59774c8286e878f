//! Runplot Run Model
//!
//! Defines the data contracts shared by the processing core and its
//! collaborators:
//! - **History:** One run's ordered metric rows, loaded from JSONL
//! - **Smoothing:** Validated smoothing settings threaded through a request
//! - **Plot:** Drawable series, axis decisions, and the renderer boundary
//! - **Manifest:** Per-batch summary merged into a run's `metadata.json`

pub mod history;
pub mod manifest;
pub mod plot;
pub mod smoothing;

pub use history::*;
pub use manifest::*;
pub use plot::*;
pub use smoothing::*;
