//! Account operations over the storefront database.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, query_scalar};
use storefront_commerce::ids::{AddressId, UserId};
use storefront_db::{current_timestamp, Db};
use tracing::{info, warn};

use crate::address::{Address, AddressInput};
use crate::mailer::{Email, Mailer};
use crate::token::{self, IssuedToken, TokenType};
use crate::user::{
    Credentials, PasswordChange, PasswordResetConfirm, Profile, ProfileUpdate, Registration, User,
};
use crate::{AuthError, PasswordHasher};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_active, created_at";

/// A new account with its first API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    pub user: User,
    pub token: IssuedToken,
}

/// Account service.
#[derive(Clone)]
pub struct AccountService {
    db: Db,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl AccountService {
    /// `frontend_url` prefixes the links put in outgoing mail.
    pub fn new(db: Db, mailer: Arc<dyn Mailer>, frontend_url: impl Into<String>) -> Self {
        Self {
            db,
            hasher: PasswordHasher,
            mailer,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create an account, an empty profile and an API token.
    pub async fn register(&self, form: Registration) -> Result<Registered, AuthError> {
        form.validate()?;
        let username = form.username.trim().to_string();
        let email = form.email.trim().to_lowercase();
        let pool = self.db.pool();

        let taken: bool = query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE lower(username) = lower(?1))")
            .bind(&username)
            .fetch_one(pool)
            .await?;
        if taken {
            return Err(AuthError::UserAlreadyExists(format!("username {username}")));
        }
        let taken: bool = query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?1)")
            .bind(&email)
            .fetch_one(pool)
            .await?;
        if taken {
            return Err(AuthError::UserAlreadyExists(format!("email {email}")));
        }

        let password_hash = self.hasher.hash(&form.password)?;
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        let user: User = query_as(&format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(form.first_name.trim())
        .bind(form.last_name.trim())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AuthError::from(e) {
            // Lost a race with a concurrent sign-up.
            AuthError::Validation(_) => AuthError::UserAlreadyExists(username.clone()),
            other => other,
        })?;

        query("INSERT INTO profiles (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)")
            .bind(user.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let token = token::issue(&mut tx, TokenType::ApiAccess, user.id).await?;
        tx.commit().await?;

        info!(user = %user.id, username = %user.username, "user registered");

        let welcome = Email {
            to: user.email.clone(),
            subject: "Welcome to the store".to_string(),
            body: format!("Hi {}, your account is ready.", user.first_name),
        };
        if let Err(e) = self.mailer.send(welcome).await {
            warn!(user = %user.id, error = %e, "welcome email failed");
        }

        Ok(Registered { user, token })
    }

    /// Exchange username and password for an API token.
    pub async fn login(&self, credentials: Credentials) -> Result<IssuedToken, AuthError> {
        let row: Option<(UserId, String, bool)> = query_as(
            "SELECT id, password_hash, is_active FROM users WHERE lower(username) = lower(?1)",
        )
        .bind(credentials.username.trim())
        .fetch_optional(self.db.pool())
        .await?;

        let Some((user, password_hash, active)) = row else {
            return Err(AuthError::InvalidCredentials);
        };
        if !active || !self.hasher.verify(&credentials.password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let mut conn = self.db.pool().acquire().await?;
        let token = token::issue(&mut conn, TokenType::ApiAccess, user).await?;
        info!(user = %user, "token issued");
        Ok(token)
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, bearer: &str) -> Result<UserId, AuthError> {
        let mut conn = self.db.pool().acquire().await?;
        token::resolve(&mut conn, TokenType::ApiAccess, bearer).await
    }

    /// Account by id.
    pub async fn user(&self, id: UserId) -> Result<User, AuthError> {
        query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AuthError::UserNotFound(id.to_string()))
    }

    /// Profile of `id`.
    pub async fn profile(&self, id: UserId) -> Result<Profile, AuthError> {
        let user = self.user(id).await?;
        let row: Option<ProfileRow> = query_as(
            "SELECT phone, birth_date, avatar, address_line1, address_line2, city, state,
                    postal_code, country, created_at, updated_at
             FROM profiles WHERE user_id = ?1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        let row = row.ok_or_else(|| AuthError::UserNotFound(id.to_string()))?;

        let has_default_address = [&row.address_line1, &row.city, &row.country]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()));

        Ok(Profile {
            full_name: user.full_name(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: row.phone,
            birth_date: row.birth_date,
            avatar: row.avatar,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            has_default_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Apply a partial profile update.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        update.validate(today())?;
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        let updated = query(
            "UPDATE users SET first_name = COALESCE(?1, first_name),
                              last_name = COALESCE(?2, last_name),
                              updated_at = ?3
             WHERE id = ?4",
        )
        .bind(update.first_name.as_deref().map(str::trim))
        .bind(update.last_name.as_deref().map(str::trim))
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(AuthError::UserNotFound(id.to_string()));
        }

        query(
            "UPDATE profiles SET phone = COALESCE(?1, phone),
                                 birth_date = COALESCE(?2, birth_date),
                                 avatar = COALESCE(?3, avatar),
                                 address_line1 = COALESCE(?4, address_line1),
                                 address_line2 = COALESCE(?5, address_line2),
                                 city = COALESCE(?6, city),
                                 state = COALESCE(?7, state),
                                 postal_code = COALESCE(?8, postal_code),
                                 country = COALESCE(?9, country),
                                 updated_at = ?10
             WHERE user_id = ?11",
        )
        .bind(&update.phone)
        .bind(update.birth_date)
        .bind(&update.avatar)
        .bind(&update.address_line1)
        .bind(&update.address_line2)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.postal_code)
        .bind(&update.country)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.profile(id).await
    }

    /// Change the password after checking the current one.
    pub async fn change_password(&self, id: UserId, form: PasswordChange) -> Result<(), AuthError> {
        let password_hash: Option<String> =
            query_scalar("SELECT password_hash FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;
        let password_hash = password_hash.ok_or_else(|| AuthError::UserNotFound(id.to_string()))?;

        if !self.hasher.verify(&form.old_password, &password_hash)? {
            return Err(AuthError::Validation("old password is incorrect".to_string()));
        }
        PasswordHasher::validate_new_password(&form.new_password, &form.new_password2)?;

        self.set_password(id, &form.new_password).await?;
        info!(user = %id, "password changed");
        Ok(())
    }

    /// Mail a single-use reset link to the account owning `email`.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        let user: Option<UserId> =
            query_scalar("SELECT id FROM users WHERE email = ?1 AND is_active = 1")
                .bind(&email)
                .fetch_optional(self.db.pool())
                .await?;
        let user = user.ok_or_else(|| {
            AuthError::Validation("no account is registered with this email".to_string())
        })?;

        let mut conn = self.db.pool().acquire().await?;
        let token = token::issue(&mut conn, TokenType::PasswordReset, user).await?;
        drop(conn);

        let link = format!("{}/reset-password/{}/", self.frontend_url, token.token);
        self.mailer
            .send(Email {
                to: email,
                subject: "Reset your password".to_string(),
                body: format!("Use this link within 24 hours to choose a new password: {link}"),
            })
            .await?;

        info!(user = %user, "password reset requested");
        Ok(())
    }

    /// Set a new password using a reset token. The token is consumed.
    pub async fn confirm_password_reset(&self, form: PasswordResetConfirm) -> Result<(), AuthError> {
        PasswordHasher::validate_new_password(&form.new_password, &form.new_password2)?;
        let password_hash = self.hasher.hash(&form.new_password)?;
        let mut tx = self.db.begin().await?;

        // Redeeming is a write, so the transaction opens with the write lock.
        // An expired token rolls back with the transaction.
        let user = token::redeem(&mut tx, TokenType::PasswordReset, &form.token)
            .await
            .map_err(|error| match error {
                AuthError::InvalidToken | AuthError::TokenExpired => {
                    AuthError::Validation("invalid or expired reset token".to_string())
                }
                other => other,
            })?;

        query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&password_hash)
            .bind(current_timestamp())
            .bind(user)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(user = %user, "password reset");
        Ok(())
    }

    /// Addresses of `user`, default first.
    pub async fn addresses(&self, user: UserId) -> Result<Vec<Address>, AuthError> {
        let addresses = query_as(
            "SELECT * FROM addresses WHERE user_id = ?1 ORDER BY is_default DESC, created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(self.db.pool())
        .await?;
        Ok(addresses)
    }

    /// One address of `user`.
    pub async fn address(&self, user: UserId, id: AddressId) -> Result<Address, AuthError> {
        query_as("SELECT * FROM addresses WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuthError::AddressNotFound(id))
    }

    /// Save a new address.
    pub async fn create_address(
        &self,
        user: UserId,
        input: AddressInput,
    ) -> Result<Address, AuthError> {
        input.validate()?;
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user, now).await?;
        }

        let address: Address = query_as(
            "INSERT INTO addresses (user_id, label, full_name, phone, address_line1, address_line2,
                                    city, state, postal_code, country, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
             RETURNING *",
        )
        .bind(user)
        .bind(input.label.trim())
        .bind(input.full_name.trim())
        .bind(&input.phone)
        .bind(input.address_line1.trim())
        .bind(&input.address_line2)
        .bind(input.city.trim())
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(input.country.trim())
        .bind(input.is_default)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_label(e, &input.label))?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace an address of `user`.
    pub async fn update_address(
        &self,
        user: UserId,
        id: AddressId,
        input: AddressInput,
    ) -> Result<Address, AuthError> {
        input.validate()?;
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user, now).await?;
        }

        let address: Option<Address> = query_as(
            "UPDATE addresses SET label = ?1, full_name = ?2, phone = ?3, address_line1 = ?4,
                                  address_line2 = ?5, city = ?6, state = ?7, postal_code = ?8,
                                  country = ?9, is_default = ?10, updated_at = ?11
             WHERE id = ?12 AND user_id = ?13
             RETURNING *",
        )
        .bind(input.label.trim())
        .bind(input.full_name.trim())
        .bind(&input.phone)
        .bind(input.address_line1.trim())
        .bind(&input.address_line2)
        .bind(input.city.trim())
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(input.country.trim())
        .bind(input.is_default)
        .bind(now)
        .bind(id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| duplicate_label(e, &input.label))?;

        let address = address.ok_or(AuthError::AddressNotFound(id))?;
        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address of `user`.
    pub async fn delete_address(&self, user: UserId, id: AddressId) -> Result<(), AuthError> {
        let deleted = query("DELETE FROM addresses WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AuthError::AddressNotFound(id));
        }
        Ok(())
    }

    /// Make one address the default and clear the flag on the others.
    pub async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Address, AuthError> {
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        let address: Option<Address> = query_as(
            "UPDATE addresses SET is_default = 1, updated_at = ?1
             WHERE id = ?2 AND user_id = ?3 RETURNING *",
        )
        .bind(now)
        .bind(id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await?;
        let address = address.ok_or(AuthError::AddressNotFound(id))?;

        query(
            "UPDATE addresses SET is_default = 0, updated_at = ?1
             WHERE user_id = ?2 AND id != ?3 AND is_default = 1",
        )
        .bind(now)
        .bind(user)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    async fn set_password(&self, id: UserId, password: &str) -> Result<(), AuthError> {
        let password_hash = self.hasher.hash(password)?;
        query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(password_hash)
            .bind(current_timestamp())
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("db", &self.db)
            .field("frontend_url", &self.frontend_url)
            .finish_non_exhaustive()
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    phone: Option<String>,
    birth_date: Option<NaiveDate>,
    avatar: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn clear_default(
    conn: &mut sqlx::SqliteConnection,
    user: UserId,
    now: i64,
) -> Result<(), sqlx::Error> {
    query("UPDATE addresses SET is_default = 0, updated_at = ?1 WHERE user_id = ?2 AND is_default = 1")
        .bind(now)
        .bind(user)
        .execute(conn)
        .await?;
    Ok(())
}

fn duplicate_label(error: sqlx::Error, label: &str) -> AuthError {
    match AuthError::from(error) {
        AuthError::Validation(_) => {
            AuthError::Validation(format!("you already have an address labelled {label:?}"))
        }
        other => other,
    }
}
