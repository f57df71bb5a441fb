//! Structured logging initialisation for the farm service.
//!
//! Two output formats are supported:
//! - [`LogFormat::Human`]: readable lines for development.
//! - [`LogFormat::Json`]: newline-delimited JSON for log aggregation.
//!
//! `RUST_LOG` overrides the caller-supplied `level` string
//! (e.g. `"info"`, `"debug,farm_engine=trace"`).

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ServiceError;

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(ServiceError::Config(format!(
                "unknown log format '{other}', expected 'human' or 'json'"
            ))),
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };
    result.map_err(|e| ServiceError::Config(format!("logging already initialised: {e}")))
}
