//! Observability infrastructure for the storefront.
//!
//! Installs the `tracing` subscriber and generates the request ids that tie
//! log lines of one HTTP request together.

mod logging;
mod request_id;

use thiserror::Error;

pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use request_id::{RequestId, REQUEST_ID_HEADER};

/// Errors raised while initialising observability.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// A global subscriber is already installed.
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),

    /// The configured level is not a valid filter directive.
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}
