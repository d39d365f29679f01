//! Structured logging setup
//!
//! The router logs through `tracing`; this module installs a
//! `tracing-subscriber` stack for binaries and tests that want to see it.
//! Libraries embedding the router usually install their own subscriber
//! instead and never call [`init_logging`].
//!
//! ## Environment Variables
//!
//! - `CHAINR_LOG_LEVEL` - `trace`/`debug`/`info`/`warn`/`error` (default `info`).
//!   `RUST_LOG`, when set, takes precedence.
//! - `CHAINR_LOG_FORMAT` - `json` (default) or `pretty`
//! - `CHAINR_LOG_FILTER` - extra comma-separated directives
//!   (e.g. `chainrouter::resolve=debug`)
//! - `CHAINR_LOG_LOCATION` - `true` to include file and line

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Pretty output at `debug`, with locations
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("CHAINR_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("CHAINR_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            target_filter: lookup("CHAINR_LOG_FILTER").filter(|f| !f.trim().is_empty()),
            include_location: lookup("CHAINR_LOG_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global subscriber described by `config`
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use chainrouter::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(e) => eprintln!("Warning: Invalid log filter directive {filter}: {e}"),
            }
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("bogus"), LogFormat::Json);
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("CHAINR_LOG_LEVEL", "debug"),
            ("CHAINR_LOG_FORMAT", "pretty"),
            ("CHAINR_LOG_FILTER", "chainrouter::resolve=trace"),
            ("CHAINR_LOG_LOCATION", "true"),
        ]);
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(
            config.target_filter.as_deref(),
            Some("chainrouter::resolve=trace")
        );
        assert!(config.include_location);
    }

    #[test]
    fn test_blank_filter_ignored() {
        assert_eq!(config_from(&[("CHAINR_LOG_FILTER", "  ")]).target_filter, None);
    }
}
