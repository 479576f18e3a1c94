//! User accounts and profiles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_commerce::ids::UserId;

use crate::AuthError;

/// Minimum customer age in years.
pub const MIN_AGE_YEARS: u32 = 18;

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl User {
    /// First and last name joined.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    /// Check the form fields. Uniqueness is checked against storage later.
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("username", &self.username),
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Validation(format!("{field} is required")));
            }
        }
        validate_email(&self.email)?;
        crate::PasswordHasher::validate_new_password(&self.password, &self.password2)
    }
}

/// Login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Profile view: account fields plus the profile's default address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub has_default_address: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial profile update; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl ProfileUpdate {
    /// Check the fields that carry rules, as of `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), AuthError> {
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        if let Some(birth_date) = self.birth_date {
            validate_birth_date(birth_date, today)?;
        }
        Ok(())
    }
}

/// Change-password form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

/// Reset-confirm form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
    pub new_password2: String,
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation(format!("invalid email: {email}")))
    }
}

/// Phones hold digits and `+` only.
pub fn validate_phone(phone: &str) -> Result<(), AuthError> {
    if phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "phone may only contain digits and +".to_string(),
        ))
    }
}

/// Customers must be adults.
pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), AuthError> {
    match today.years_since(birth_date) {
        Some(age) if age >= MIN_AGE_YEARS => Ok(()),
        _ => Err(AuthError::Validation(format!(
            "you must be at least {MIN_AGE_YEARS} years old"
        ))),
    }
}
