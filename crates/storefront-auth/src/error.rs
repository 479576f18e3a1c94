//! Authentication errors.

use sqlx::error::{DatabaseError, ErrorKind as SqlErrorKind};
use storefront_commerce::ids::AddressId;
use storefront_commerce::ErrorKind;
use storefront_db::DbError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token unknown, used, or of the wrong type.
    #[error("token invalid or expired")]
    InvalidToken,

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// The two password fields differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Username or email already registered.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Address not found, or owned by someone else.
    #[error("address not found: {0}")]
    AddressNotFound(AddressId),

    /// Field validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Password hashing failure.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Connection or transaction error.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired
        )
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                ErrorKind::Unauthorized
            }
            AuthError::WeakPassword(_)
            | AuthError::PasswordMismatch
            | AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::UserAlreadyExists(_) => ErrorKind::Conflict,
            AuthError::UserNotFound(_) | AuthError::AddressNotFound(_) => ErrorKind::NotFound,
            AuthError::Hash(_) | AuthError::Database(_) | AuthError::Db(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(error: sqlx::Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => {
                AuthError::Validation("value already in use".to_string())
            }
            _ => AuthError::Database(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::PasswordMismatch.kind(), ErrorKind::Validation);
        assert_eq!(AuthError::UserAlreadyExists("ana".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            AuthError::AddressNotFound(AddressId::new(3)).kind(),
            ErrorKind::NotFound
        );
        assert!(AuthError::TokenExpired.is_auth_failure());
        assert!(!AuthError::PasswordMismatch.is_auth_failure());
    }
}
