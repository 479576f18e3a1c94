//! Order price computation.
//!
//! Totals follow one fixed recipe:
//!
//! ```text
//! subtotal = sum(effective unit price * quantity)
//! shipping = flat fee
//! tax      = round(subtotal * tax_rate)
//! discount = coupon amount, or round(subtotal * percent / 100)
//! total    = subtotal + shipping + tax - discount
//! ```
//!
//! Each component is rounded on its own, so `total` always equals the sum of
//! the stored components exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::coupons::{Coupon, CouponDiscount};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Store-wide pricing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Currency every order is priced in.
    pub currency: Currency,
    /// Flat shipping fee added to every order.
    pub shipping_flat: Money,
    /// Tax rate applied to the subtotal, e.g. `0.18`.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: Currency::PEN,
            shipping_flat: Money::new(1_000, Currency::PEN),
            tax_rate: Decimal::new(18, 2),
        }
    }
}

/// Money breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// `total == subtotal + shipping_cost + tax - discount`.
    pub fn is_balanced(&self) -> bool {
        self.subtotal
            .checked_add(&self.shipping_cost)
            .and_then(|m| m.checked_add(&self.tax))
            .and_then(|m| m.checked_sub(&self.discount))
            .map(|expected| expected == self.total)
            .unwrap_or(false)
    }
}

/// Outcome of resolving the coupon code supplied with an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponApplication {
    /// The code matched an active coupon.
    Applied { code: String, discount: CouponDiscount },
    /// No code, or the code did not match an active coupon.
    NoCoupon,
}

impl CouponApplication {
    /// Resolve an optional lookup result.
    pub fn from_lookup(coupon: Option<Coupon>) -> Self {
        match coupon {
            Some(coupon) => CouponApplication::Applied {
                code: coupon.code,
                discount: coupon.discount,
            },
            None => CouponApplication::NoCoupon,
        }
    }

    /// Discount produced against `subtotal`.
    pub fn discount_on(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        match self {
            CouponApplication::Applied { discount, .. } => discount.amount_off(subtotal),
            CouponApplication::NoCoupon => Ok(Money::zero(subtotal.currency)),
        }
    }

    /// Code of the applied coupon.
    pub fn code(&self) -> Option<&str> {
        match self {
            CouponApplication::Applied { code, .. } => Some(code),
            CouponApplication::NoCoupon => None,
        }
    }
}

/// A validated order line with its price snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_sku: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

impl PricingPolicy {
    /// Snapshot `product` at its effective price for `quantity` units.
    pub fn price_line(&self, product: &Product, quantity: i64) -> Result<PricedLine, CommerceError> {
        let unit_price = product.effective_price();
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        Ok(PricedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            product_sku: product.sku.clone(),
            unit_price,
            quantity,
            subtotal: unit_price.times(quantity)?,
        })
    }

    /// Compute the order totals for already-priced lines.
    pub fn totals(
        &self,
        lines: &[PricedLine],
        coupon: &CouponApplication,
    ) -> Result<OrderTotals, CommerceError> {
        let subtotal = Money::sum(lines.iter().map(|l| &l.subtotal), self.currency)?;
        let shipping_cost = self.shipping_flat;
        let tax = subtotal.apply_rate(self.tax_rate)?;
        let discount = coupon.discount_on(&subtotal)?;
        let total = subtotal
            .checked_add(&shipping_cost)?
            .checked_add(&tax)?
            .checked_sub(&discount)?;

        Ok(OrderTotals {
            subtotal,
            shipping_cost,
            tax,
            discount,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::product::sample_product;

    fn line(price_cents: i64, quantity: i64) -> PricedLine {
        let mut product = sample_product(1, 10);
        product.price = Money::new(price_cents, Currency::PEN);
        PricingPolicy::default().price_line(&product, quantity).unwrap()
    }

    fn percent(code: &str, value: i64) -> CouponApplication {
        CouponApplication::Applied {
            code: code.to_string(),
            discount: CouponDiscount::Percent(Decimal::from(value)),
        }
    }

    #[test]
    fn test_worked_example() {
        let totals = PricingPolicy::default()
            .totals(&[line(10_000, 2)], &percent("WELCOME10", 10))
            .unwrap();

        assert_eq!(totals.subtotal.amount_cents, 20_000);
        assert_eq!(totals.shipping_cost.amount_cents, 1_000);
        assert_eq!(totals.tax.amount_cents, 3_600);
        assert_eq!(totals.discount.amount_cents, 2_000);
        assert_eq!(totals.total.amount_cents, 22_600);
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_no_coupon_means_zero_discount() {
        let totals = PricingPolicy::default()
            .totals(&[line(59_999, 1)], &CouponApplication::NoCoupon)
            .unwrap();

        assert!(totals.discount.is_zero());
        // 599.99 * 0.18 = 107.9982
        assert_eq!(totals.tax.amount_cents, 10_800);
        assert_eq!(totals.total.amount_cents, 59_999 + 1_000 + 10_800);
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_amount_coupon_is_not_capped() {
        let coupon = CouponApplication::Applied {
            code: "FLAT25".to_string(),
            discount: CouponDiscount::Amount(Decimal::from(25)),
        };
        let totals = PricingPolicy::default()
            .totals(&[line(1_000, 1)], &coupon)
            .unwrap();

        assert_eq!(totals.discount.amount_cents, 2_500);
        assert_eq!(totals.total.amount_cents, 1_000 + 1_000 + 180 - 2_500);
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_sale_price_is_used() {
        let mut product = sample_product(1, 10);
        product.price = Money::new(10_000, Currency::PEN);
        product.sale_price = Some(Money::new(8_000, Currency::PEN));

        let priced = PricingPolicy::default().price_line(&product, 3).unwrap();
        assert_eq!(priced.unit_price.amount_cents, 8_000);
        assert_eq!(priced.subtotal.amount_cents, 24_000);
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut product = sample_product(1, 10);
        product.price = Money::new(10_000, Currency::USD);

        let result = PricingPolicy::default().price_line(&product, 1);
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_unbalanced_detected() {
        let mut totals = PricingPolicy::default()
            .totals(&[line(500, 1)], &CouponApplication::NoCoupon)
            .unwrap();
        totals.total = Money::new(totals.total.amount_cents + 1, Currency::PEN);
        assert!(!totals.is_balanced());
    }

    #[test]
    fn test_from_lookup() {
        assert_eq!(CouponApplication::from_lookup(None), CouponApplication::NoCoupon);
        assert_eq!(CouponApplication::NoCoupon.code(), None);
        assert_eq!(percent("X", 5).code(), Some("X"));
    }
}
