//! Error types shared across Runplot crates.

/// How many available metric names a "not found" message lists before
/// collapsing the rest into a count.
pub const AVAILABLE_PREVIEW_LEN: usize = 10;

/// Top-level error type for Runplot operations.
#[derive(Debug, thiserror::Error)]
pub enum RunplotError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No valid data points for metric '{metric}'")]
    NoData { metric: String },

    #[error("Run has no history data: {label}")]
    EmptyHistory { label: String },

    #[error(
        "Metrics not found: {}\nAvailable metrics: {}",
        .missing.join(", "),
        available_preview(.available)
    )]
    MetricNotFound {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using RunplotError.
pub type RunplotResult<T> = Result<T, RunplotError>;

impl RunplotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn no_data(metric: impl Into<String>) -> Self {
        Self::NoData {
            metric: metric.into(),
        }
    }

    pub fn empty_history(label: impl Into<String>) -> Self {
        Self::EmptyHistory {
            label: label.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }
}

/// Comma-joined preview of the first few available metrics, with a
/// "(+N more)" suffix when the list is truncated.
pub fn available_preview(available: &[String]) -> String {
    let shown = available
        .iter()
        .take(AVAILABLE_PREVIEW_LEN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if available.len() > AVAILABLE_PREVIEW_LEN {
        format!("{shown} (+{} more)", available.len() - AVAILABLE_PREVIEW_LEN)
    } else {
        shown
    }
}
