//! Money type for representing monetary values.
//!
//! Amounts are integer minor units (cents). Rates and percentages are
//! `rust_decimal::Decimal` and every product of money and a rate is rounded
//! half away from zero back to minor units, so no floating point ever touches
//! a price.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    PEN,
    USD,
    EUR,
    GBP,
    MXN,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "PEN").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::PEN => "PEN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::MXN => "MXN",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "S/").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::PEN => "S/",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::MXN => "MX$",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "PEN" => Some(Currency::PEN),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "MXN" => Some(Currency::MXN),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
            .ok_or_else(|| CommerceError::ValidationError(format!("unknown currency: {s}")))
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from a decimal amount, rounding half away from
    /// zero to the currency's minor unit.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use storefront_commerce::money::{Currency, Money};
    ///
    /// let price = Money::from_decimal(Decimal::new(49_995, 3), Currency::PEN).unwrap();
    /// assert_eq!(price.amount_cents, 5000);
    /// ```
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, CommerceError> {
        let places = currency.decimal_places();
        let scale = Decimal::from(10_i64.pow(places));
        let minor = amount
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(scale)
            .and_then(|d| d.to_i64())
            .ok_or(CommerceError::Overflow)?;
        Ok(Self::new(minor, currency))
    }

    /// Parse a decimal string such as `"599.99"`.
    pub fn parse(amount: &str, currency: Currency) -> Result<Self, CommerceError> {
        let decimal = Decimal::from_str(amount.trim())
            .map_err(|e| CommerceError::ValidationError(format!("invalid amount {amount:?}: {e}")))?;
        Self::from_decimal(decimal, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to an exact decimal value.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_cents, self.currency.decimal_places())
    }

    /// Format as a display string (e.g., "S/49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.to_decimal())
    }

    /// Format without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        self.to_decimal().to_string()
    }

    /// Add another Money value of the same currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|cents| Money::new(cents, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Subtract another Money value of the same currency.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(|cents| Money::new(cents, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a whole quantity.
    pub fn times(&self, quantity: i64) -> Result<Money, CommerceError> {
        self.amount_cents
            .checked_mul(quantity)
            .map(|cents| Money::new(cents, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a rate (e.g. `0.18`), rounded to minor units.
    pub fn apply_rate(&self, rate: Decimal) -> Result<Money, CommerceError> {
        let product = self
            .to_decimal()
            .checked_mul(rate)
            .ok_or(CommerceError::Overflow)?;
        Money::from_decimal(product, self.currency)
    }

    /// Calculate a percentage of this amount (e.g. `10` for 10%).
    pub fn percentage(&self, percent: Decimal) -> Result<Money, CommerceError> {
        let rate = percent
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(CommerceError::Overflow)?;
        self.apply_rate(rate)
    }

    /// Sum an iterator of Money values.
    pub fn sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency != other.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
