//! Authentication tokens.
//!
//! Opaque bearer tokens for API access and single-use password reset tokens.
//! Only the SHA-256 digest of a token is stored.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{query, query_as, SqliteConnection};
use storefront_commerce::ids::UserId;
use storefront_db::current_timestamp;

use crate::AuthError;

/// Token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// API access token.
    ApiAccess,
    /// Password reset token.
    PasswordReset,
}

impl TokenType {
    /// Get token type as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::ApiAccess => "api_access",
            TokenType::PasswordReset => "password_reset",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "api_access" => Some(TokenType::ApiAccess),
            "password_reset" => Some(TokenType::PasswordReset),
            _ => None,
        }
    }

    /// Get default expiration time for this token type (in seconds).
    pub fn default_expiry_secs(&self) -> i64 {
        match self {
            TokenType::ApiAccess => 30 * 24 * 60 * 60, // 30 days
            TokenType::PasswordReset => 24 * 60 * 60,  // 24 hours
        }
    }
}

/// A freshly issued token. The plain value is only ever seen here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The token value.
    pub token: String,
    pub token_type: TokenType,
    pub user_id: UserId,
    /// Unix timestamp when token expires.
    pub expires_at: i64,
}

/// Generate a cryptographically secure token string.
pub(crate) fn generate_token_string() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 24] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a token, the form kept in storage.
pub(crate) fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Create and store a token for `user`.
pub(crate) async fn issue(
    conn: &mut SqliteConnection,
    token_type: TokenType,
    user: UserId,
) -> Result<IssuedToken, AuthError> {
    let now = current_timestamp();
    let token = IssuedToken {
        token: generate_token_string(),
        token_type,
        user_id: user,
        expires_at: now + token_type.default_expiry_secs(),
    };

    query(
        "INSERT INTO auth_tokens (token_hash, token_type, user_id, created_at, expires_at, used)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
    )
    .bind(hash_token(&token.token))
    .bind(token_type.as_str())
    .bind(user)
    .bind(now)
    .bind(token.expires_at)
    .execute(conn)
    .await?;

    Ok(token)
}

/// Resolve a presented token to its owner.
///
/// Unknown tokens, tokens of another type and used tokens are all
/// `InvalidToken`; the caller learns nothing about which.
pub(crate) async fn resolve(
    conn: &mut SqliteConnection,
    token_type: TokenType,
    token: &str,
) -> Result<UserId, AuthError> {
    let row: Option<(UserId, String, i64, bool)> = query_as(
        "SELECT user_id, token_type, expires_at, used FROM auth_tokens WHERE token_hash = ?1",
    )
    .bind(hash_token(token))
    .fetch_optional(conn)
    .await?;

    let Some((user, kind, expires_at, used)) = row else {
        return Err(AuthError::InvalidToken);
    };
    if TokenType::parse(&kind) != Some(token_type) || used {
        return Err(AuthError::InvalidToken);
    }
    if current_timestamp() > expires_at {
        return Err(AuthError::TokenExpired);
    }
    Ok(user)
}

/// Spend a single-use token and return its owner.
///
/// The token is marked used by the same statement that finds it, so two
/// concurrent redemptions cannot both succeed.
pub(crate) async fn redeem(
    conn: &mut SqliteConnection,
    token_type: TokenType,
    token: &str,
) -> Result<UserId, AuthError> {
    let row: Option<(UserId, i64)> = query_as(
        "UPDATE auth_tokens SET used = 1
         WHERE token_hash = ?1 AND token_type = ?2 AND used = 0
         RETURNING user_id, expires_at",
    )
    .bind(hash_token(token))
    .bind(token_type.as_str())
    .fetch_optional(conn)
    .await?;

    let Some((user, expires_at)) = row else {
        return Err(AuthError::InvalidToken);
    };
    if current_timestamp() > expires_at {
        return Err(AuthError::TokenExpired);
    }
    Ok(user)
}
