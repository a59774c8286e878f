//! Logging and tracing initialization.
//!
//! Logs go to stderr (or the configured file) so that command output on
//! stdout stays machine-readable.

use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level. Returns `false` if a subscriber was already installed.
///
/// Unusable settings (bad filter directives, an unopenable log file) fall
/// back to defaults and are reported as warnings through the new subscriber.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let mut fallbacks = Vec::new();
    let filter = build_filter(std::env::var("RUST_LOG").ok(), &config.level, &mut fallbacks);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer(config, &mut fallbacks));

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder
            .with_target(true)
            .with_ansi(config.file.is_none())
            .try_init()
    }
    .is_ok();

    if installed {
        for reason in &fallbacks {
            tracing::warn!("{reason}");
        }
    }
    installed
}

fn build_filter(env: Option<String>, level: &str, fallbacks: &mut Vec<String>) -> EnvFilter {
    if let Some(directives) = env.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(&directives) {
            Ok(filter) => return filter,
            Err(e) => fallbacks.push(format!("Ignoring invalid RUST_LOG {directives:?}: {e}")),
        }
    }

    EnvFilter::try_new(level).unwrap_or_else(|e| {
        fallbacks.push(format!("Invalid log level {level:?}: {e}; using info"));
        EnvFilter::new("info")
    })
}

fn make_writer(config: &LoggingConfig, fallbacks: &mut Vec<String>) -> BoxMakeWriter {
    let Some(path) = &config.file else {
        return BoxMakeWriter::new(std::io::stderr);
    };

    let opened = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path);
    match opened {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            fallbacks.push(format!(
                "Failed to open log file {}: {e}; logging to stderr",
                path.display()
            ));
            BoxMakeWriter::new(std::io::stderr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_directives_override_level() {
        let mut fallbacks = Vec::new();
        let filter = build_filter(Some("warn".to_string()), "debug", &mut fallbacks);
        assert_eq!(filter.to_string(), "warn");
        assert!(fallbacks.is_empty());
    }

    #[test]
    fn test_blank_env_uses_configured_level() {
        let mut fallbacks = Vec::new();
        let filter = build_filter(Some("  ".to_string()), "debug", &mut fallbacks);
        assert_eq!(filter.to_string(), "debug");
        assert_eq!(build_filter(None, "info", &mut fallbacks).to_string(), "info");
        assert!(fallbacks.is_empty());
    }

    #[test]
    fn test_invalid_directives_fall_back_with_reason() {
        let mut fallbacks = Vec::new();
        let filter = build_filter(
            Some("runplot=loudest".to_string()),
            "runplot=loudest",
            &mut fallbacks,
        );
        assert_eq!(filter.to_string(), "info");
        assert_eq!(fallbacks.len(), 2);
        assert!(fallbacks[0].contains("RUST_LOG"));
        assert!(fallbacks[1].contains("using info"));
    }

    #[test]
    fn test_unopenable_log_file_falls_back_with_reason() {
        let config = LoggingConfig {
            file: Some(
                std::env::temp_dir()
                    .join("runplot_test_missing_log_dir")
                    .join("nested")
                    .join("runplot.log"),
            ),
            ..LoggingConfig::default()
        };
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("runplot_test_missing_log_dir"));

        let mut fallbacks = Vec::new();
        make_writer(&config, &mut fallbacks);
        assert_eq!(fallbacks.len(), 1);
        assert!(fallbacks[0].contains("runplot.log"));
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        init_logging(&LoggingConfig::default());
        assert!(!init_logging(&LoggingConfig::default()));
    }
}
