//! Test helpers.

use std::sync::Arc;

use salvo::prelude::*;
use storefront_auth::{MemoryMailer, Registration};
use storefront_commerce::catalog::{NewCategory, NewProduct, Product};
use storefront_commerce::orders::PricingPolicy;
use storefront_commerce::{CategoryId, Currency, Money};
use storefront_db::Db;
use testresult::TestResult;

use crate::{app_router, AppState};

pub(crate) const PASSWORD: &str = "Secret123";

pub(crate) async fn test_state_with_mailer() -> TestResult<(Arc<AppState>, Arc<MemoryMailer>)> {
    let db = Db::in_memory().await?;
    db.migrate().await?;

    let mailer = Arc::new(MemoryMailer::default());
    let state = AppState::new(
        db,
        PricingPolicy::default(),
        mailer.clone(),
        "http://shop.test",
    );

    Ok((state.shared(), mailer))
}

pub(crate) async fn test_state() -> TestResult<Arc<AppState>> {
    Ok(test_state_with_mailer().await?.0)
}

pub(crate) fn service(state: Arc<AppState>) -> Service {
    Service::new(app_router(state))
}

/// Register `username` and return its API token.
pub(crate) async fn register(state: &AppState, username: &str) -> TestResult<String> {
    let registered = state
        .accounts
        .register(Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        })
        .await?;

    Ok(registered.token.token)
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub(crate) async fn seed_category(state: &AppState, name: &str) -> TestResult<CategoryId> {
    let category = state
        .catalog
        .create_category(NewCategory {
            name: name.to_string(),
            ..NewCategory::default()
        })
        .await?;

    Ok(category.id)
}

pub(crate) async fn seed_product(
    state: &AppState,
    name: &str,
    price_cents: i64,
    stock: i64,
    category_id: Option<CategoryId>,
) -> TestResult<Product> {
    let product = state
        .catalog
        .create_product(NewProduct {
            name: name.to_string(),
            slug: None,
            sku: name.to_uppercase().replace(' ', "-"),
            description: format!("{name} description"),
            category_id,
            brand_id: None,
            price: Money::new(price_cents, Currency::PEN),
            sale_price: None,
            stock,
            is_featured: true,
            is_new: false,
            material_ids: Vec::new(),
        })
        .await?;

    Ok(product)
}
