//! Fixtures shared by the storage tests.

use sqlx::{query, query_scalar};
use storefront_db::{current_timestamp, Db};

use crate::catalog::slugify;
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};

pub(crate) async fn memory_db() -> Result<Db, CommerceError> {
    let db = Db::in_memory().await?;
    db.migrate().await?;
    Ok(db)
}

pub(crate) async fn insert_user(db: &Db, username: &str) -> Result<UserId, sqlx::Error> {
    let now = current_timestamp();
    query_scalar(
        "INSERT INTO users (username, email, password_hash, created_at, updated_at)
         VALUES (?1, ?2, 'x', ?3, ?3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(now)
    .fetch_one(db.pool())
    .await
}

pub(crate) async fn insert_product(
    db: &Db,
    name: &str,
    price_cents: i64,
    stock: i64,
) -> Result<ProductId, sqlx::Error> {
    let slug = slugify(name);
    query_scalar(
        "INSERT INTO products (name, slug, sku, price_cents, stock, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(name)
    .bind(&slug)
    .bind(slug.to_uppercase())
    .bind(price_cents)
    .bind(stock)
    .bind(current_timestamp())
    .fetch_one(db.pool())
    .await
}

pub(crate) async fn stock_of(db: &Db, product: ProductId) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(product)
        .fetch_one(db.pool())
        .await
}

pub(crate) async fn deactivate_product(db: &Db, product: ProductId) -> Result<(), sqlx::Error> {
    query("UPDATE products SET is_active = 0 WHERE id = ?1")
        .bind(product)
        .execute(db.pool())
        .await?;
    Ok(())
}
