//! Shared handler state.

use std::sync::Arc;

use storefront_auth::{AccountService, Mailer};
use storefront_commerce::catalog::Catalog;
use storefront_commerce::coupons::CouponBook;
use storefront_commerce::orders::{OrderService, PlainTextInvoice, PricingPolicy, SqliteOrderStore};
use storefront_db::Db;

/// Services behind the routes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub coupons: CouponBook,
    pub orders: OrderService<SqliteOrderStore>,
    pub accounts: AccountService,
    pub invoices: PlainTextInvoice,
}

impl AppState {
    pub fn new(
        db: Db,
        pricing: PricingPolicy,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog: Catalog::new(db.clone()),
            coupons: CouponBook::new(db.clone()),
            orders: OrderService::new(SqliteOrderStore::new(db.clone()), pricing),
            accounts: AccountService::new(db, mailer, frontend_url),
            invoices: PlainTextInvoice,
        }
    }

    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
