//! Order placement and lifecycle.
//!
//! [`OrderService::place_order`] validates the request against current
//! catalog state, prices it with the [`PricingPolicy`], and hands the result
//! to the [`OrderStore`], which writes everything in one transaction.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::address::ShippingDetails;
use crate::catalog::Product;
use crate::coupons::{normalize_code, CouponCheck};
use crate::error::{CommerceError, ErrorKind};
use crate::ids::{ProductId, UserId};
use crate::orders::store::{OrderDraft, OrderStore};
use crate::orders::{CouponApplication, Invoice, InvoiceRenderer, Order, PricingPolicy};

/// One requested line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    pub items: Vec<LineRequest>,
    /// Blank counts as no code.
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub order_notes: String,
}

/// Order workflow over a store.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
    pricing: PricingPolicy,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(store: S, pricing: PricingPolicy) -> Self {
        Self { store, pricing }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Place an order for `user`.
    ///
    /// The first validation failure is returned and nothing is written. An
    /// unknown or inactive coupon code is not an error; the order is simply
    /// priced without a discount.
    pub async fn place_order(
        &self,
        user: UserId,
        request: PlaceOrder,
    ) -> Result<Order, CommerceError> {
        let result = self.try_place_order(user, request).await;
        match &result {
            Ok(order) => info!(
                user = %user,
                order_number = %order.order_number,
                items = order.item_count(),
                total = %order.totals.total,
                coupon = order.coupon_code.as_deref().unwrap_or("-"),
                "order placed"
            ),
            Err(e) if e.kind() == ErrorKind::Internal => {
                error!(user = %user, error = %e, "order placement failed")
            }
            Err(e) => warn!(user = %user, error = %e, "order rejected"),
        }
        result
    }

    async fn try_place_order(
        &self,
        user: UserId,
        request: PlaceOrder,
    ) -> Result<Order, CommerceError> {
        if request.items.is_empty() {
            return Err(CommerceError::EmptyOrder);
        }

        let ids: Vec<ProductId> = request.items.iter().map(|line| line.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .store
            .active_products(&ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut lines = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = products
                .get(&line.product_id)
                .filter(|product| product.is_active)
                .ok_or(CommerceError::ProductUnavailable(line.product_id))?;

            if line.quantity < 1 {
                return Err(CommerceError::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }

            if !product.can_fulfill(line.quantity) {
                return Err(CommerceError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            lines.push(self.pricing.price_line(product, line.quantity)?);
        }

        request.shipping.validate()?;

        let coupon = match normalize_code(request.coupon_code.as_deref()) {
            Some(code) => {
                let found = self.store.active_coupon(code).await?;
                debug!(code, applied = found.is_some(), "coupon resolved");
                CouponApplication::from_lookup(found)
            }
            None => CouponApplication::NoCoupon,
        };

        let totals = self.pricing.totals(&lines, &coupon)?;
        if !totals.is_balanced() {
            return Err(CommerceError::Unbalanced);
        }

        let now = Utc::now();
        let draft = OrderDraft {
            order_number: Order::generate_order_number(now),
            user_id: user,
            shipping: request.shipping,
            order_notes: request.order_notes.trim().to_string(),
            coupon_code: coupon.code().map(str::to_string),
            currency: self.pricing.currency,
            totals,
            lines,
            placed_at: now.timestamp(),
        };

        self.store.commit_order(draft).await
    }

    /// Cancel a pending or confirmed order owned by `user` and restore its
    /// stock. Orders of other users are reported as not found.
    pub async fn cancel_order(
        &self,
        user: UserId,
        order_number: &str,
    ) -> Result<Order, CommerceError> {
        match self.store.cancel_order(user, order_number).await {
            Ok(order) => {
                info!(user = %user, order_number, items = order.item_count(), "order cancelled");
                Ok(order)
            }
            Err(e) => {
                warn!(user = %user, order_number, error = %e, "cancel rejected");
                Err(e)
            }
        }
    }

    /// Orders of `user`, newest first.
    pub async fn list_orders(&self, user: UserId) -> Result<Vec<Order>, CommerceError> {
        self.store.orders_for_user(user).await
    }

    /// One order of `user`, with status history.
    pub async fn get_order(&self, user: UserId, order_number: &str) -> Result<Order, CommerceError> {
        self.store
            .find_order(user, order_number)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(order_number.to_string()))
    }

    /// Read-only coupon probe.
    pub async fn check_coupon(&self, code: &str) -> Result<CouponCheck, CommerceError> {
        let coupon = match normalize_code(Some(code)) {
            Some(code) => self.store.active_coupon(code).await?,
            None => None,
        };
        Ok(CouponCheck::from_lookup(coupon.as_ref()))
    }

    /// Render the invoice of one of `user`'s orders.
    pub async fn render_invoice(
        &self,
        user: UserId,
        order_number: &str,
        renderer: &dyn InvoiceRenderer,
    ) -> Result<Invoice, CommerceError> {
        let order = self.get_order(user, order_number).await?;
        renderer.render(&order)
    }
}
