use crate::{ConfigError, Environment, FromEnv, env_or_default};
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Output format of log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable output for local development
    Pretty,
    /// One JSON object per line for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
}

impl TracingConfig {
    /// Defaults for the given operating mode: JSON in production, pretty otherwise.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            level: "info".to_string(),
            format: if environment.is_production() {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
        }
    }
}

impl FromEnv for TracingConfig {
    /// Environment variables:
    /// - `LOG_LEVEL` (default: `info`)
    /// - `LOG_FORMAT`: `pretty` or `json` (default depends on `APP_ENV`)
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(Environment::from_env());
        let level = env_or_default("LOG_LEVEL", &defaults.level);
        let format = match std::env::var("LOG_FORMAT") {
            Ok(value) => value.parse().map_err(|details| ConfigError::ParseError {
                key: "LOG_FORMAT".to_string(),
                details,
            })?,
            Err(_) => defaults.format,
        };

        Ok(Self { level, format })
    }
}

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with an `EnvFilter`, the configured formatter and `ErrorLayer`.
///
/// `RUST_LOG` overrides `config.level` when set. JSON output lists every enclosing span,
/// so fields recorded on an outer request span (such as `correlation_id`) show up on each line.
///
/// Calling this more than once is a no-op (common in tests).
pub fn init_tracing(config: &TracingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
    };

    match result {
        Ok(_) => info!(level = %config.level, format = ?config.format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_tracing_config_defaults_follow_environment() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("LOG_LEVEL", None),
                ("LOG_FORMAT", None),
            ],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.level, "info");
                assert_eq!(config.format, LogFormat::Json);
            },
        );
        temp_env::with_vars(
            [("APP_ENV", None::<&str>), ("LOG_FORMAT", None::<&str>)],
            || {
                assert_eq!(TracingConfig::from_env().unwrap().format, LogFormat::Pretty);
            },
        );
    }

    #[test]
    fn test_tracing_config_explicit_values() {
        temp_env::with_vars(
            [("LOG_LEVEL", Some("debug")), ("LOG_FORMAT", Some("json"))],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.level, "debug");
                assert_eq!(config.format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_tracing_config_rejects_unknown_format() {
        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            let err = TracingConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("LOG_FORMAT"));
        });
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        let config = TracingConfig::for_environment(Environment::Development);
        init_tracing(&config);
        init_tracing(&TracingConfig::for_environment(Environment::Production));
    }
}
