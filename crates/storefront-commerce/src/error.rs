//! Commerce error types.

use sqlx::error::{DatabaseError, ErrorKind as SqlErrorKind};
use storefront_db::DbError;
use thiserror::Error;

use crate::ids::ProductId;
use crate::orders::OrderStatus;

/// Broad category of a failure, used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or violates a business rule.
    Validation,
    /// The caller could not be identified.
    Unauthorized,
    /// The addressed resource does not exist for this caller.
    NotFound,
    /// The request conflicts with current state.
    Conflict,
    /// The storage layer failed.
    Internal,
}

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// An order needs at least one line item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Product missing or inactive at order time.
    #[error("Product {0} not found or inactive")]
    ProductUnavailable(ProductId),

    /// Line quantity below one.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// Not enough stock to fill a line.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Order not found, or owned by someone else.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order status does not allow cancellation.
    #[error("Order {order_number} cannot be cancelled while {status}")]
    CannotCancel {
        order_number: String,
        status: OrderStatus,
    },

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Coupon not found.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Unit price moved between quoting and committing an order.
    #[error("Price of product {0} changed while the order was being placed")]
    PriceChanged(ProductId),

    /// Coupon deactivated between quoting and committing an order.
    #[error("Coupon {0} is no longer active")]
    CouponWithdrawn(String),

    /// Unique key already taken.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Computed totals failed the balance check.
    #[error("Order totals do not balance")]
    Unbalanced,

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Stored data could not be decoded.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Connection or transaction error.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl CommerceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::EmptyOrder
            | CommerceError::ProductUnavailable(_)
            | CommerceError::InvalidQuantity { .. }
            | CommerceError::InsufficientStock { .. }
            | CommerceError::CannotCancel { .. }
            | CommerceError::CurrencyMismatch { .. }
            | CommerceError::ValidationError(_) => ErrorKind::Validation,
            CommerceError::OrderNotFound(_)
            | CommerceError::ProductNotFound(_)
            | CommerceError::CategoryNotFound(_)
            | CommerceError::CouponNotFound(_) => ErrorKind::NotFound,
            CommerceError::AlreadyExists(_)
            | CommerceError::PriceChanged(_)
            | CommerceError::CouponWithdrawn(_) => ErrorKind::Conflict,
            CommerceError::Overflow
            | CommerceError::Unbalanced
            | CommerceError::CorruptRecord(_)
            | CommerceError::Database(_)
            | CommerceError::Db(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for CommerceError {
    fn from(error: sqlx::Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => {
                CommerceError::AlreadyExists(database_message(&error))
            }
            Some(SqlErrorKind::ForeignKeyViolation) => {
                CommerceError::ValidationError("related resource not found".to_string())
            }
            Some(SqlErrorKind::CheckViolation | SqlErrorKind::NotNullViolation) => {
                CommerceError::ValidationError(database_message(&error))
            }
            _ => CommerceError::Database(error),
        }
    }
}

fn database_message(error: &sqlx::Error) -> String {
    error
        .as_database_error()
        .map(|db| db.message().to_string())
        .unwrap_or_else(|| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(CommerceError::EmptyOrder.kind(), ErrorKind::Validation);
        assert_eq!(
            CommerceError::OrderNotFound("ORD-1".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CommerceError::CannotCancel {
                order_number: "ORD-1".into(),
                status: OrderStatus::Shipped,
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(CommerceError::Overflow.kind(), ErrorKind::Internal);
        assert_eq!(
            CommerceError::PriceChanged(ProductId::new(1)).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CommerceError::CouponWithdrawn("HALF".into()).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = CommerceError::InsufficientStock {
            product_id: ProductId::new(5),
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 5: requested 3, available 1"
        );
    }

    #[test]
    fn test_row_not_found_is_internal() {
        let err = CommerceError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
