//! Coupon types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::CouponId;
use crate::money::Money;

/// What a coupon takes off an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CouponDiscount {
    /// Fixed amount in the order currency. Not capped at the subtotal.
    Amount(Decimal),
    /// Percentage of the subtotal, `0..=100`.
    Percent(Decimal),
}

impl CouponDiscount {
    /// Stored type name.
    pub fn kind(&self) -> &'static str {
        match self {
            CouponDiscount::Amount(_) => "amount",
            CouponDiscount::Percent(_) => "percent",
        }
    }

    /// Raw discount value.
    pub fn value(&self) -> Decimal {
        match self {
            CouponDiscount::Amount(v) | CouponDiscount::Percent(v) => *v,
        }
    }

    /// Build from the stored type and value columns.
    pub fn from_parts(kind: &str, value: &str) -> Result<Self, CommerceError> {
        let value = Decimal::from_str(value.trim()).map_err(|e| {
            CommerceError::ValidationError(format!("invalid discount value {value:?}: {e}"))
        })?;

        let discount = match kind {
            "amount" => CouponDiscount::Amount(value),
            "percent" => CouponDiscount::Percent(value),
            other => {
                return Err(CommerceError::ValidationError(format!(
                    "unknown discount type: {other}"
                )))
            }
        };
        discount.validate()?;
        Ok(discount)
    }

    /// Reject negative values and percentages above 100.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.value().is_sign_negative() {
            return Err(CommerceError::ValidationError(
                "discount value must not be negative".to_string(),
            ));
        }
        if let CouponDiscount::Percent(p) = self {
            if *p > Decimal::ONE_HUNDRED {
                return Err(CommerceError::ValidationError(
                    "percent discount must be at most 100".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Money taken off `subtotal`.
    pub fn amount_off(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        match self {
            CouponDiscount::Amount(value) => Money::from_decimal(*value, subtotal.currency),
            CouponDiscount::Percent(percent) => subtotal.percentage(*percent),
        }
    }
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Unique code customers type in.
    pub code: String,
    pub discount: CouponDiscount,
    pub is_active: bool,
    /// Number of orders the coupon was applied to.
    pub used_count: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

/// Input for creating a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount: CouponDiscount,
}

/// Answer of the coupon probe.
///
/// Serializes as `{"valid": true, "discount": "10", "type": "percent"}`, or
/// `{"valid": false, "discount": "0"}` when the code is unknown or inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponCheck {
    pub valid: bool,
    pub discount: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CouponCheck {
    /// Build the probe answer from a lookup result.
    pub fn from_lookup(coupon: Option<&Coupon>) -> Self {
        match coupon {
            Some(coupon) => CouponCheck {
                valid: true,
                discount: coupon.discount.value().to_string(),
                kind: Some(coupon.discount.kind().to_string()),
            },
            None => CouponCheck {
                valid: false,
                discount: "0".to_string(),
                kind: None,
            },
        }
    }
}

/// Normalize a user-supplied code; blank means no code.
pub fn normalize_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}
