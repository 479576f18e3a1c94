//! Checkout, order lifecycle and invoices.

mod invoice;
mod order;
mod pricing;
mod store;
mod workflow;

pub use invoice::{Invoice, InvoiceRenderer, PlainTextInvoice};
pub use order::{Order, OrderItem, OrderStatus, StatusEntry};
pub use pricing::{CouponApplication, OrderTotals, PricedLine, PricingPolicy};
pub use store::{OrderDraft, OrderStore, SqliteOrderStore};
pub use workflow::{LineRequest, OrderService, PlaceOrder};
