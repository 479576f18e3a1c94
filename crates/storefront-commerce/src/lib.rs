//! Storefront commerce domain.
//!
//! This crate holds the catalog, coupons and the order workflow:
//!
//! - **Catalog**: categories, brands, materials, products, reviews
//! - **Coupons**: discount codes and the validation probe
//! - **Orders**: pricing, atomic checkout, cancellation, invoices
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//!
//! let service = OrderService::new(SqliteOrderStore::new(db), PricingPolicy::default());
//! let order = service
//!     .place_order(user, PlaceOrder {
//!         shipping,
//!         items: vec![LineRequest { product_id, quantity: 2 }],
//!         coupon_code: Some("WELCOME10".to_string()),
//!         order_notes: String::new(),
//!     })
//!     .await?;
//! println!("Total: {}", order.totals.total.display());
//! ```

pub mod address;
pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod coupons;
pub mod orders;

#[cfg(test)]
mod testing;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::address::ShippingDetails;
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        Brand, Catalog, Category, Material, NewProduct, Page, PageRequest, Pagination, Product,
        ProductDetail, ProductFilter, ProductOrdering, Review,
    };

    // Coupons
    pub use crate::coupons::{Coupon, CouponBook, CouponCheck, CouponDiscount, NewCoupon};

    // Orders
    pub use crate::orders::{
        CouponApplication, Invoice, InvoiceRenderer, LineRequest, Order, OrderItem, OrderService,
        OrderStatus, OrderStore, OrderTotals, PlaceOrder, PlainTextInvoice, PricingPolicy,
        SqliteOrderStore,
    };
}
