//! Tracing subscriber setup.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::ObservabilityError;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Compact human-readable lines.
    Human,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// `[logging]` section of the store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// Check that the level parses as a filter directive.
    pub fn validate(&self) -> Result<(), ObservabilityError> {
        configured_filter(&self.level).map(|_| ())
    }
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed, so call it once per process.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    let filter = build_env_filter(config)?;
    match config.format {
        LogFormat::Json => init_with_layer(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
            filter,
        ),
        LogFormat::Human => init_with_layer(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true),
            filter,
        ),
    }
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ObservabilityError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => configured_filter(&config.level),
    }
}

fn configured_filter(level: &str) -> Result<EnvFilter, ObservabilityError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(ObservabilityError::InvalidLevel(level.to_string()));
    }
    // sqlx logs every statement at info.
    EnvFilter::try_new(format!("{level},sqlx=warn"))
        .map_err(|_| ObservabilityError::InvalidLevel(level.to_string()))
}

fn init_with_layer<L>(fmt_layer: L, filter: EnvFilter) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;
    Ok(())
}
