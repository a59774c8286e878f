//! Metadata manifest written next to generated plots.
//!
//! The manifest is merged into an existing `metadata.json` rather than
//! replacing it, so keys written by other tools survive regeneration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::smoothing::SmoothingAlgorithm;

/// Default manifest file name inside an output directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Summary of one plot batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotManifest {
    /// Run identifiers (falling back to labels for runs without one).
    pub run_ids: Vec<String>,

    /// Run labels in input order.
    pub run_labels: Vec<String>,

    /// Generation time (RFC 3339).
    pub generation_timestamp: String,

    /// Smoothing applied to every plot of the batch.
    pub smoothing: SmoothingAlgorithm,

    /// Rolling window as requested, kept for older readers of the manifest.
    pub smoothing_window: Option<usize>,

    /// Metrics that were requested.
    pub metrics_plotted: Vec<String>,

    /// File names of the plots that were written.
    pub plots_generated: Vec<String>,

    pub plot_count: usize,

    /// Total history rows across all runs.
    pub data_points: usize,

    /// Plotted points per metric, per series label.
    pub point_counts: BTreeMap<String, BTreeMap<String, usize>>,

    /// Per-metric failure reasons.
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
}

impl PlotManifest {
    /// Current time formatted for `generation_timestamp`.
    pub fn now_timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Shallow-merge `update` over `existing`: same-named keys are overwritten,
/// unrelated keys are preserved.
pub fn merge_metadata(
    mut existing: Map<String, JsonValue>,
    update: Map<String, JsonValue>,
) -> Map<String, JsonValue> {
    for (key, value) in update {
        existing.insert(key, value);
    }
    existing
}

/// Write the manifest into `dir/metadata.json`.
///
/// With `merge`, an existing JSON object in that file is merged with the
/// manifest. A missing, unreadable, or non-object existing file is replaced.
pub fn write_metadata_json(
    dir: impl AsRef<Path>,
    manifest: &PlotManifest,
    merge: bool,
) -> Result<PathBuf, ManifestError> {
    let path = dir.as_ref().join(METADATA_FILE);

    let update = match serde_json::to_value(manifest).map_err(|e| ManifestError::ParseError {
        path: path.clone(),
        source: e,
    })? {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    };

    let merged = if merge {
        match read_existing(&path) {
            Some(existing) => merge_metadata(existing, update),
            None => update,
        }
    } else {
        update
    };

    let json = serde_json::to_string_pretty(&JsonValue::Object(merged)).map_err(|e| {
        ManifestError::ParseError {
            path: path.clone(),
            source: e,
        }
    })?;
    std::fs::write(&path, json).map_err(|e| ManifestError::IoError {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

fn read_existing(path: &Path) -> Option<Map<String, JsonValue>> {
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read existing metadata at {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str::<JsonValue>(&content) {
        Ok(JsonValue::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!("Existing metadata at {:?} is not an object; replacing", path);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to parse existing metadata at {:?}: {}", path, e);
            None
        }
    }
}

/// Errors that can occur when persisting manifests.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error for {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
