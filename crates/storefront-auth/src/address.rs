//! Saved delivery addresses.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_commerce::ids::{AddressId, UserId};

use crate::user::validate_phone;
use crate::AuthError;

/// A saved address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// Unique per user, case-insensitive (e.g. "Home").
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Address form for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub label: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("label", &self.label),
            ("full_name", &self.full_name),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Validation(format!("{field} is required")));
            }
        }
        validate_phone(&self.phone)
    }
}
