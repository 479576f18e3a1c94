//! Customer accounts for the storefront.
//!
//! Provides registration, bearer-token login, profiles, saved addresses and
//! password change and reset.

mod accounts;
mod address;
mod error;
mod mailer;
mod password;
mod token;
mod user;

pub use accounts::{AccountService, Registered};
pub use address::{Address, AddressInput};
pub use error::AuthError;
pub use mailer::{Email, LogMailer, Mailer, MemoryMailer};
pub use password::PasswordHasher;
pub use token::{IssuedToken, TokenType};
pub use user::{
    validate_birth_date, validate_email, validate_phone, Credentials, PasswordChange,
    PasswordResetConfirm, Profile, ProfileUpdate, Registration, User, MIN_AGE_YEARS,
};
