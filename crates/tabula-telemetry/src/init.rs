//! Logging setup for hosts that embed record stores.
//!
//! # Design
//! - One entry point installs a `tracing` registry with an env filter and
//!   either a JSON or a human-readable fmt layer.
//! - The build SHA lives in a process-wide cell and is logged once on
//!   installation.
//! - Store internals log under the `tabula_store` target, which can be tuned
//!   separately from the host's level.

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Target under which record stores emit their events.
pub const STORE_TARGET: &str = "tabula_store";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::directives`].
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] if a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_target(config.targets),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(config.targets))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })?;

    tracing::info!(
        build_sha = build_sha(),
        format = config.format.as_str(),
        "logging initialised"
    );
    Ok(())
}

/// Build SHA recorded by [`init_logging`], or `dev` before installation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Base level for every target (e.g. `info`).
    pub level: &'a str,
    /// Level override for [`STORE_TARGET`]; `None` inherits `level`.
    pub store_level: Option<&'a str>,
    /// Output format.
    pub format: LogFormat,
    /// Whether log lines include their target.
    pub targets: bool,
    /// Build identifier recorded once at startup.
    pub build_sha: &'a str,
}

impl LoggingConfig<'_> {
    /// Filter directives derived from the configured levels.
    #[must_use]
    pub fn directives(&self) -> String {
        self.store_level.map_or_else(
            || self.level.to_string(),
            |store| format!("{},{STORE_TARGET}={store}", self.level),
        )
    }
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            store_level: None,
            format: LogFormat::infer(),
            targets: false,
            build_sha: build_sha(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty for debug builds, JSON otherwise.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Configuration name of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }

    /// Parse a configuration name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Read `log_format` from a JSON host configuration. Unrecognised names fall
/// back to [`LogFormat::infer`]; a missing key yields `None`.
#[must_use]
pub fn log_format_from_config(config: Option<&serde_json::Value>) -> Option<LogFormat> {
    let name = config?.get("log_format")?.as_str()?;
    Some(LogFormat::parse(name).unwrap_or_else(LogFormat::infer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_names_parse_leniently() {
        assert_eq!(LogFormat::parse(" JSON "), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("text"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn log_format_from_config_reads_key() {
        assert_eq!(
            log_format_from_config(Some(&json!({"log_format": "json"}))),
            Some(LogFormat::Json)
        );
        assert_eq!(
            log_format_from_config(Some(&json!({"log_format": "xml"}))),
            Some(LogFormat::infer())
        );
        assert!(log_format_from_config(Some(&json!({"log_format": 3}))).is_none());
        assert!(log_format_from_config(Some(&json!({}))).is_none());
        assert!(log_format_from_config(None).is_none());
    }

    #[test]
    fn directives_scope_store_override() {
        let mut config = LoggingConfig {
            level: "warn",
            ..LoggingConfig::default()
        };
        assert_eq!(config.directives(), "warn");
        config.store_level = Some("trace");
        assert_eq!(config.directives(), "warn,tabula_store=trace");
    }

    #[test]
    fn init_logging_installs_subscriber_once() {
        let config = LoggingConfig {
            format: LogFormat::Pretty,
            build_sha: "abc123",
            ..LoggingConfig::default()
        };
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::SubscriberInstall { .. })
        ));
        assert_eq!(build_sha(), "abc123");
    }
}
