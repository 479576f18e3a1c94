//! Error types and status mapping.

use std::fmt::Display;

use salvo::http::StatusError;
use storefront_auth::AuthError;
use storefront_commerce::{CommerceError, ErrorKind};
use thiserror::Error;
use tracing::error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },
}

/// Domain errors that know their broad kind.
pub(crate) trait Classified: Display {
    fn kind(&self) -> ErrorKind;
}

impl Classified for CommerceError {
    fn kind(&self) -> ErrorKind {
        CommerceError::kind(self)
    }
}

impl Classified for AuthError {
    fn kind(&self) -> ErrorKind {
        AuthError::kind(self)
    }
}

/// Map a domain error to its HTTP status.
///
/// Internal failures are logged here and reach the client without detail.
pub(crate) fn into_status_error<E: Classified>(error: E) -> StatusError {
    match error.kind() {
        ErrorKind::Validation => StatusError::bad_request().brief(error.to_string()),
        ErrorKind::Unauthorized => StatusError::unauthorized().brief(error.to_string()),
        ErrorKind::NotFound => StatusError::not_found().brief(error.to_string()),
        ErrorKind::Conflict => StatusError::conflict().brief(error.to_string()),
        ErrorKind::Internal => {
            error!("request failed: {error}");

            StatusError::internal_server_error()
        }
    }
}
