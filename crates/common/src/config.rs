//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default normalization constant for the time-weighted EMA.
pub const DEFAULT_VIEWPORT_SCALE: f64 = 1000.0;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where generated plot data and metadata are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Default smoothing settings applied when the command line is silent.
    #[serde(default)]
    pub smoothing: SmoothingDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default smoothing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingDefaults {
    /// Rolling-mean window. `None` or values below 2 disable rolling smoothing.
    #[serde(default)]
    pub window: Option<usize>,

    /// EMA weight in (0, 1). `None` disables EMA smoothing.
    #[serde(default)]
    pub ema_weight: Option<f64>,

    /// EMA viewport scale, must be positive.
    #[serde(default = "default_viewport_scale")]
    pub viewport_scale: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "runplot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            smoothing: SmoothingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SmoothingDefaults {
    fn default() -> Self {
        Self {
            window: None,
            ema_weight: None,
            viewport_scale: DEFAULT_VIEWPORT_SCALE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("runplot_plots")
}

fn default_viewport_scale() -> f64 {
    DEFAULT_VIEWPORT_SCALE
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("runplot").join("config.json")
}
