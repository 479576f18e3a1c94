//! Order types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::address::ShippingDetails;
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use crate::orders::pricing::OrderTotals;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    Pending,
    /// Order confirmed and paid.
    Confirmed,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Only orders that have not started fulfilment can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Statuses from which cancellation is allowed.
    pub fn cancellable() -> impl Iterator<Item = OrderStatus> {
        Self::ALL.into_iter().filter(OrderStatus::can_cancel)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CommerceError::CorruptRecord(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Owning customer.
    pub user_id: UserId,
    /// Contact and delivery fields.
    pub shipping: ShippingDetails,
    /// Customer note.
    pub order_notes: String,
    /// Coupon code that produced the discount, if any.
    pub coupon_code: Option<String>,
    /// Order currency.
    pub currency: Currency,
    /// Money breakdown.
    pub totals: OrderTotals,
    /// Order status.
    pub status: OrderStatus,
    /// Payment flag.
    pub is_paid: bool,
    /// Unix timestamp of payment.
    pub paid_at: Option<i64>,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    /// Status changes, oldest first. Only loaded for detail views.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<StatusEntry>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Order {
    /// Generate a new order number, e.g. `ORD-20250314-9f3a1c2b`.
    pub fn generate_order_number(now: DateTime<Utc>) -> String {
        let suffix: u32 = rand::thread_rng().gen();
        format!("ORD-{}-{:08x}", now.format("%Y%m%d"), suffix)
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A line of a persisted order. Product fields are a snapshot taken at
/// purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    /// Line identifier.
    pub id: OrderItemId,
    /// Product reference, cleared if the product is deleted.
    pub product_id: Option<ProductId>,
    /// Product name at purchase time.
    pub product_name: String,
    /// Product SKU at purchase time.
    pub product_sku: String,
    /// Unit price at purchase time.
    pub product_price: Money,
    /// Units purchased.
    pub quantity: i64,
    /// `product_price * quantity`.
    pub subtotal: Money,
}

/// One entry of an order's status history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEntry {
    /// Status entered.
    pub status: OrderStatus,
    /// Free-text note.
    pub comment: String,
    /// Acting user, if any.
    pub created_by: Option<UserId>,
    /// Unix timestamp.
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_can_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
        assert_eq!(
            OrderStatus::cancellable().collect::<Vec<_>>(),
            vec![OrderStatus::Pending, OrderStatus::Confirmed]
        );
    }

    #[test]
    fn test_order_number_format() {
        let now = DateTime::from_timestamp(1_741_910_400, 0).unwrap();
        let number = Order::generate_order_number(now);
        assert!(number.starts_with("ORD-20250314-"));
        assert_eq!(number.len(), "ORD-20250314-".len() + 8);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
