//! Logging setup.
//!
//! Standard output carries the rewritten sources, so every log line goes to
//! standard error.

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use attrsplit_foundation::{Error, Result};

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Logging options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Explicit filter directive; takes precedence over `RUST_LOG`.
    pub level: Option<String>,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// Sets an explicit filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

/// Builds the event filter for `level`, falling back to `RUST_LOG` and then
/// to [`DEFAULT_FILTER`].
///
/// # Errors
/// Returns a configuration error if `level` is not a valid directive.
pub fn env_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|err| Error::config(format!("invalid log level `{level}`: {err}"))),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns a configuration error for an invalid filter or if a subscriber
/// is already installed.
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = env_filter(config.level.as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
        registry.with(fmt_layer).try_init()
    };
    installed.map_err(|err| Error::config(format!("failed to install logger: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_is_used() {
        let filter = env_filter(Some("attrsplit_engine=debug,warn")).unwrap();
        let text = filter.to_string();
        assert!(text.contains("attrsplit_engine=debug"));
        assert!(text.contains("warn"));
    }

    #[test]
    fn invalid_level_is_a_config_error() {
        let err = env_filter(Some("attrsplit=loud")).unwrap_err();
        assert!(format!("{err}").contains("invalid log level"));
    }

    #[test]
    fn builder_sets_fields() {
        let config = TelemetryConfig::default()
            .with_level("debug")
            .with_json_logs(true);
        assert_eq!(config.level.as_deref(), Some("debug"));
        assert!(config.json_logs);
    }
}
