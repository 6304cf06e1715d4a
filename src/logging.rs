//! Tracing setup for binaries embedding the playback core.
//!
//! The library itself only emits `tracing` events; a host application calls
//! [`init_logging`] once at startup to install a subscriber. Tests and hosts
//! with their own subscriber skip this entirely.

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TtsError};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors, for development.
    Pretty,
    /// Single-line format for production logs.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Compact;
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Custom filter directive (e.g. `"tts_playback=debug,reqwest=warn"`).
    /// Defaults to this crate at `info` and noisy HTTP internals at `warn`,
    /// overridable through `RUST_LOG`.
    pub filter: Option<String>,
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Install the global tracing subscriber.
///
/// Call once during application startup.
///
/// # Errors
///
/// Returns [`TtsError::InvalidConfig`] if the filter directive does not
/// parse or a subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = match &config.filter {
        Some(custom) => EnvFilter::try_new(custom)
            .map_err(|e| TtsError::InvalidConfig(format!("invalid log filter: {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,h2=warn,hyper=warn,reqwest=warn",
                env!("CARGO_PKG_NAME").replace('-', "_")
            ))
        }),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let init_result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };
    init_result.map_err(|e| TtsError::InvalidConfig(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_filter("tts_playback=trace");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.filter.as_deref(), Some("tts_playback=trace"));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let result = init_logging(LoggingConfig::default().with_filter("===not a filter"));
        assert!(matches!(result, Err(TtsError::InvalidConfig(_))));
    }
}
