//! Order persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind as SqlErrorKind};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{query, query_as, query_scalar, FromRow, QueryBuilder, Row, Sqlite};
use storefront_db::{current_timestamp, Db};
use tracing::{debug, warn};

use crate::address::ShippingDetails;
use crate::catalog::Product;
use crate::coupons::{find_active, Coupon};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use crate::orders::pricing::{OrderTotals, PricedLine};
use crate::orders::{Order, OrderItem, OrderStatus, StatusEntry};

/// A priced, validated order ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub order_number: String,
    pub user_id: UserId,
    pub shipping: ShippingDetails,
    pub order_notes: String,
    /// Code of the coupon whose usage counter is bumped.
    pub coupon_code: Option<String>,
    pub currency: Currency,
    pub totals: OrderTotals,
    pub lines: Vec<PricedLine>,
    /// Unix timestamp used for creation and payment.
    pub placed_at: i64,
}

/// Storage seam of the order workflow.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Load the active products among `ids`. Missing or inactive ids are
    /// simply absent from the result.
    async fn active_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CommerceError>;

    /// Look up an active coupon by exact code.
    async fn active_coupon(&self, code: &str) -> Result<Option<Coupon>, CommerceError>;

    /// Decrement stock and write the order, its items and its first history
    /// entry as one unit. Nothing is written on error. Unit prices and the
    /// coupon are checked again inside the unit, so a stale quote fails with
    /// [`CommerceError::PriceChanged`] or [`CommerceError::CouponWithdrawn`].
    async fn commit_order(&self, mut draft: OrderDraft) -> Result<Order, CommerceError> {
        let mut tx = self.db.begin().await?;

        // Stock first: the opening write takes the database write lock, and
        // the guards on `stock` and the unit price make a drained or repriced
        // product fail the whole order.
        for line in &draft.lines {
            let updated = query(
                "UPDATE products SET stock = stock - ?1, updated_at = ?3
                 WHERE id = ?2 AND is_active = 1 AND stock >= ?1
                   AND CASE WHEN sale_price_cents < price_cents
                            THEN sale_price_cents ELSE price_cents END = ?4",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .bind(draft.placed_at)
            .bind(line.unit_price.amount_cents)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                let current: Option<(i64, i64)> = query_as(
                    "SELECT stock, CASE WHEN sale_price_cents < price_cents
                                        THEN sale_price_cents ELSE price_cents END
                     FROM products WHERE id = ?1 AND is_active = 1",
                )
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                warn!(
                    product = %line.product_id,
                    requested = line.quantity,
                    quoted_cents = line.unit_price.amount_cents,
                    ?current,
                    "product changed before commit"
                );

                return Err(match current {
                    None => CommerceError::ProductUnavailable(line.product_id),
                    Some((_, price_cents)) if price_cents != line.unit_price.amount_cents => {
                        CommerceError::PriceChanged(line.product_id)
                    }
                    Some((available, _)) => CommerceError::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available,
                    },
                });
            }
        }

        if let Some(code) = &draft.coupon_code {
            let used = query(
                "UPDATE coupons SET used_count = used_count + 1 WHERE code = ?1 AND is_active = 1",
            )
            .bind(code)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if used == 0 {
                warn!(code = %code, "coupon withdrawn before commit");
                return Err(CommerceError::CouponWithdrawn(code.clone()));
            }
            debug!(code = %code, "coupon usage recorded");
        }

        let mut attempt = 1;
        let order_id = loop {
            match insert_order(&mut tx, &draft).await {
                Ok(id) => break id,
                Err(e) if attempt < ORDER_NUMBER_ATTEMPTS && is_unique_violation(&e) => {
                    warn!(order_number = %draft.order_number, attempt, "order number taken");
                    let placed_at =
                        DateTime::from_timestamp(draft.placed_at, 0).unwrap_or_else(Utc::now);
                    draft.order_number = Order::generate_order_number(placed_at);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let item_id: OrderItemId = query_scalar(
                "INSERT INTO order_items (order_id, product_id, product_name, product_sku,
                                          product_price_cents, quantity, subtotal_cents)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(&line.product_sku)
            .bind(line.unit_price.amount_cents)
            .bind(line.quantity)
            .bind(line.subtotal.amount_cents)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: item_id,
                product_id: Some(line.product_id),
                product_name: line.product_name.clone(),
                product_sku: line.product_sku.clone(),
                product_price: line.unit_price,
                quantity: line.quantity,
                subtotal: line.subtotal,
            });
        }

        let confirmed = StatusEntry {
            status: OrderStatus::Confirmed,
            comment: "Order placed and paid".to_string(),
            created_by: Some(draft.user_id),
            created_at: draft.placed_at,
        };
        insert_history(&mut tx, order_id, &confirmed).await?;

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            order_number: draft.order_number,
            user_id: draft.user_id,
            shipping: draft.shipping,
            order_notes: draft.order_notes,
            coupon_code: draft.coupon_code,
            currency: draft.currency,
            totals: draft.totals,
            status: OrderStatus::Confirmed,
            is_paid: true,
            paid_at: Some(draft.placed_at),
            items,
            history: vec![confirmed],
            created_at: draft.placed_at,
            updated_at: draft.placed_at,
        })
    }

    async fn cancel_order(
        &self,
        user: UserId,
        order_number: &str,
    ) -> Result<Order, CommerceError> {
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        // The status guard lets exactly one of two racing cancels through.
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
        qb.push_bind(OrderStatus::Cancelled.as_str())
            .push(", updated_at = ")
            .push_bind(now)
            .push(" WHERE order_number = ")
            .push_bind(order_number)
            .push(" AND user_id = ")
            .push_bind(user)
            .push(" AND status IN (");
        let mut separated = qb.separated(", ");
        for status in OrderStatus::cancellable() {
            separated.push_bind(status.as_str());
        }
        separated.push_unseparated(")");

        let cancelled = qb.build().execute(&mut *tx).await?.rows_affected();

        if cancelled == 0 {
            let status: Option<String> =
                query_scalar("SELECT status FROM orders WHERE order_number = ?1 AND user_id = ?2")
                    .bind(order_number)
                    .bind(user)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match status {
                Some(status) => CommerceError::CannotCancel {
                    order_number: order_number.to_string(),
                    status: status.parse()?,
                },
                None => CommerceError::OrderNotFound(order_number.to_string()),
            });
        }

        let mut order = load_order(&mut tx, user, order_number)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(order_number.to_string()))?;

        for item in &order.items {
            let Some(product_id) = item.product_id else {
                continue;
            };
            query("UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
                .bind(item.quantity)
                .bind(now)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }

        let entry = StatusEntry {
            status: OrderStatus::Cancelled,
            comment: "Cancelled by customer".to_string(),
            created_by: Some(user),
            created_at: now,
        };
        insert_history(&mut tx, order.id, &entry).await?;

        tx.commit().await?;

        order.history.push(entry);
        Ok(order)
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, CommerceError> {
        let pool = self.db.pool();

        let mut orders: Vec<Order> = query_as(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(pool)
        .await?;

        let rows: Vec<ItemRow> = query_as(
            "SELECT oi.* FROM order_items oi JOIN orders o ON o.id = oi.order_id
             WHERE o.user_id = ?1 ORDER BY oi.id",
        )
        .bind(user)
        .fetch_all(pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<ItemRow>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_id).or_default().push(row);
        }

        for order in &mut orders {
            order.items = by_order
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|row| row.into_item(order.currency))
                .collect();
        }

        Ok(orders)
    }

    async fn find_order(
        &self,
        user: UserId,
        order_number: &str,
    ) -> Result<Option<Order>, CommerceError> {
        let mut conn = self.db.pool().acquire().await?;
        load_order(&mut conn, user, order_number).await
    }
}

/// Load one order with items and history over a single connection.
/// Fresh order numbers tried before a collision is reported.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

async fn insert_order(
    conn: &mut SqliteConnection,
    draft: &OrderDraft,
) -> Result<OrderId, sqlx::Error> {
    let shipping = &draft.shipping;
    let totals = &draft.totals;
    query_scalar(
        "INSERT INTO orders (user_id, order_number, full_name, email, phone, address_line1,
                             address_line2, city, state, postal_code, country, order_notes,
                             coupon_code, currency, subtotal_cents, shipping_cents, tax_cents,
                             discount_cents, total_cents, status, is_paid, paid_at,
                             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, 1, ?21, ?21, ?21)
         RETURNING id",
    )
    .bind(draft.user_id)
    .bind(&draft.order_number)
    .bind(shipping.full_name.trim())
    .bind(shipping.email.trim())
    .bind(&shipping.phone)
    .bind(shipping.address_line1.trim())
    .bind(&shipping.address_line2)
    .bind(shipping.city.trim())
    .bind(&shipping.state)
    .bind(&shipping.postal_code)
    .bind(shipping.country.trim())
    .bind(&draft.order_notes)
    .bind(&draft.coupon_code)
    .bind(draft.currency.code())
    .bind(totals.subtotal.amount_cents)
    .bind(totals.shipping_cost.amount_cents)
    .bind(totals.tax.amount_cents)
    .bind(totals.discount.amount_cents)
    .bind(totals.total.amount_cents)
    .bind(OrderStatus::Confirmed.as_str())
    .bind(draft.placed_at)
    .fetch_one(conn)
    .await
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| matches!(db.kind(), SqlErrorKind::UniqueViolation))
}

async fn load_order(
    conn: &mut SqliteConnection,
    user: UserId,
    order_number: &str,
) -> Result<Option<Order>, CommerceError> {
    let order: Option<Order> =
        query_as("SELECT * FROM orders WHERE order_number = ?1 AND user_id = ?2")
            .bind(order_number)
            .bind(user)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(mut order) = order else {
        return Ok(None);
    };

    let rows: Vec<ItemRow> = query_as("SELECT * FROM order_items WHERE order_id = ?1 ORDER BY id")
        .bind(order.id)
        .fetch_all(&mut *conn)
        .await?;
    order.items = rows
        .into_iter()
        .map(|row| row.into_item(order.currency))
        .collect();

    order.history = query_as(
        "SELECT status, comment, created_by, created_at FROM order_status_history
         WHERE order_id = ?1 ORDER BY created_at, id",
    )
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(order))
}

async fn insert_history(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    entry: &StatusEntry,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO order_status_history (order_id, status, comment, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(order_id)
    .bind(entry.status.as_str())
    .bind(&entry.comment)
    .bind(entry.created_by)
    .bind(entry.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: Option<ProductId>,
    product_name: String,
    product_sku: String,
    product_price_cents: i64,
    quantity: i64,
    subtotal_cents: i64,
}

impl ItemRow {
    fn into_item(self, currency: Currency) -> OrderItem {
        OrderItem {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            product_sku: self.product_sku,
            product_price: Money::new(self.product_price_cents, currency),
            quantity: self.quantity,
            subtotal: Money::new(self.subtotal_cents, currency),
        }
    }
}

fn decode_err(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}

fn decode_status(row: &SqliteRow) -> sqlx::Result<OrderStatus> {
    let status: String = row.try_get("status")?;
    status
        .parse()
        .map_err(|e: CommerceError| decode_err("status", e.to_string()))
}

impl<'r> FromRow<'r, SqliteRow> for Order {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let code: String = row.try_get("currency")?;
        let currency = Currency::from_code(&code)
            .ok_or_else(|| decode_err("currency", format!("unknown currency {code}")))?;
        let money = |column: &str| -> sqlx::Result<Money> {
            Ok(Money::new(row.try_get(column)?, currency))
        };

        Ok(Self {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            user_id: row.try_get("user_id")?,
            shipping: ShippingDetails {
                full_name: row.try_get("full_name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                address_line1: row.try_get("address_line1")?,
                address_line2: row.try_get("address_line2")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                postal_code: row.try_get("postal_code")?,
                country: row.try_get("country")?,
            },
            order_notes: row.try_get("order_notes")?,
            coupon_code: row.try_get("coupon_code")?,
            currency,
            totals: OrderTotals {
                subtotal: money("subtotal_cents")?,
                shipping_cost: money("shipping_cents")?,
                tax: money("tax_cents")?,
                discount: money("discount_cents")?,
                total: money("total_cents")?,
            },
            status: decode_status(row)?,
            is_paid: row.try_get("is_paid")?,
            paid_at: row.try_get("paid_at")?,
            items: Vec::new(),
            history: Vec::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for StatusEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            status: decode_status(row)?,
            comment: row.try_get("comment")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::sample_details;
    use crate::coupons::{CouponBook, CouponDiscount, NewCoupon};
    use crate::testing::{deactivate_product, insert_product, insert_user, memory_db, stock_of};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    fn draft(user: UserId, lines: Vec<PricedLine>) -> OrderDraft {
        let subtotal = Money::new(lines.iter().map(|l| l.subtotal.amount_cents).sum(), Currency::PEN);
        OrderDraft {
            order_number: format!("ORD-20250101-{:08x}", user.get()),
            user_id: user,
            shipping: sample_details(),
            order_notes: String::new(),
            coupon_code: None,
            currency: Currency::PEN,
            totals: OrderTotals {
                subtotal,
                shipping_cost: Money::zero(Currency::PEN),
                tax: Money::zero(Currency::PEN),
                discount: Money::zero(Currency::PEN),
                total: subtotal,
            },
            lines,
            placed_at: 1_735_689_600,
        }
    }

    fn priced(product_id: ProductId, price_cents: i64, quantity: i64) -> PricedLine {
        let unit_price = Money::new(price_cents, Currency::PEN);
        PricedLine {
            product_id,
            product_name: "Chair".to_string(),
            product_sku: "CHAIR".to_string(),
            unit_price,
            quantity,
            subtotal: Money::new(price_cents * quantity, Currency::PEN),
        }
    }

    #[tokio::test]
    async fn test_active_products_skips_inactive() -> TestResult {
        let db = memory_db().await?;
        let a = insert_product(&db, "Chair", 1_000, 5).await?;
        let b = insert_product(&db, "Table", 2_000, 5).await?;
        deactivate_product(&db, b).await?;

        let store = SqliteOrderStore::new(db);
        let products = store.active_products(&[a, b, ProductId::new(999)]).await?;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, a);
        assert!(store.active_products(&[]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_and_find() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        let placed = store.commit_order(draft(user, vec![priced(chair, 1_000, 2)])).await?;
        assert_eq!(placed.status, OrderStatus::Confirmed);
        assert!(placed.is_paid);
        assert_eq!(stock_of(&db, chair).await?, 3);

        let found = store
            .find_order(user, &placed.order_number)
            .await?
            .ok_or("order missing")?;
        assert_eq!(found.items, placed.items);
        assert_eq!(found.totals, placed.totals);
        assert_eq!(found.history.len(), 1);
        assert_eq!(found.history[0].status, OrderStatus::Confirmed);
        assert_eq!(found.shipping, placed.shipping);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_rolls_back_on_drained_line() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let table = insert_product(&db, "Table", 2_000, 1).await?;
        let store = SqliteOrderStore::new(db.clone());

        let result = store
            .commit_order(draft(user, vec![priced(chair, 1_000, 2), priced(table, 2_000, 3)]))
            .await;
        assert!(matches!(
            result,
            Err(CommerceError::InsufficientStock { requested: 3, available: 1, .. })
        ));

        assert_eq!(stock_of(&db, chair).await?, 5);
        assert_eq!(stock_of(&db, table).await?, 1);
        assert!(store.orders_for_user(user).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_logs() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        let placed = store.commit_order(draft(user, vec![priced(chair, 1_000, 2)])).await?;
        let cancelled = store.cancel_order(user, &placed.order_number).await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&db, chair).await?, 5);
        let statuses: Vec<OrderStatus> = cancelled.history.iter().map(|h| h.status).collect();
        assert_eq!(statuses, [OrderStatus::Confirmed, OrderStatus::Cancelled]);

        let again = store.cancel_order(user, &placed.order_number).await;
        assert!(matches!(
            again,
            Err(CommerceError::CannotCancel { status: OrderStatus::Cancelled, .. })
        ));
        assert_eq!(stock_of(&db, chair).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_skips_deleted_products() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        let placed = store.commit_order(draft(user, vec![priced(chair, 1_000, 1)])).await?;
        query("DELETE FROM products WHERE id = ?1")
            .bind(chair)
            .execute(db.pool())
            .await?;

        let cancelled = store.cancel_order(user, &placed.order_number).await?;
        assert_eq!(cancelled.items[0].product_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_orders_are_invisible() -> TestResult {
        let db = memory_db().await?;
        let owner = insert_user(&db, "ana").await?;
        let other = insert_user(&db, "luis").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        let placed = store.commit_order(draft(owner, vec![priced(chair, 1_000, 1)])).await?;

        assert!(store.find_order(other, &placed.order_number).await?.is_none());
        assert!(matches!(
            store.cancel_order(other, &placed.order_number).await,
            Err(CommerceError::OrderNotFound(_))
        ));
        assert_eq!(stock_of(&db, chair).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_orders_for_user_attaches_items() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 10).await?;
        let table = insert_product(&db, "Table", 2_000, 10).await?;
        let store = SqliteOrderStore::new(db);

        let mut first = draft(user, vec![priced(chair, 1_000, 1)]);
        first.order_number = "ORD-20250101-00000001".to_string();
        let mut second = draft(user, vec![priced(chair, 1_000, 1), priced(table, 2_000, 2)]);
        second.order_number = "ORD-20250101-00000002".to_string();
        second.placed_at += 60;

        store.commit_order(first).await?;
        store.commit_order(second).await?;

        let orders = store.orders_for_user(user).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "ORD-20250101-00000002");
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[1].items.len(), 1);
        assert!(orders[0].history.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_guard_follows_status_rule() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 100).await?;
        let store = SqliteOrderStore::new(db.clone());

        for (n, status) in OrderStatus::ALL.into_iter().enumerate() {
            let mut next = draft(user, vec![priced(chair, 1_000, 1)]);
            next.order_number = format!("ORD-20250101-{n:08x}");
            let placed = store.commit_order(next).await?;
            query("UPDATE orders SET status = ?1 WHERE id = ?2")
                .bind(status.as_str())
                .bind(placed.id)
                .execute(db.pool())
                .await?;

            let result = store.cancel_order(user, &placed.order_number).await;
            if status.can_cancel() {
                assert_eq!(result?.status, OrderStatus::Cancelled, "{status}");
            } else {
                assert!(
                    matches!(result, Err(CommerceError::CannotCancel { status: s, .. }) if s == status),
                    "{status}"
                );
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_rejects_repriced_product() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        query("UPDATE products SET sale_price_cents = 800 WHERE id = ?1")
            .bind(chair)
            .execute(db.pool())
            .await?;

        let result = store.commit_order(draft(user, vec![priced(chair, 1_000, 2)])).await;
        assert!(matches!(result, Err(CommerceError::PriceChanged(id)) if id == chair));
        assert_eq!(stock_of(&db, chair).await?, 5);
        assert!(store.orders_for_user(user).await?.is_empty());

        store.commit_order(draft(user, vec![priced(chair, 800, 2)])).await?;
        assert_eq!(stock_of(&db, chair).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_rejects_withdrawn_coupon() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let coupons = CouponBook::new(db.clone());
        coupons
            .create(NewCoupon {
                code: "HALF".to_string(),
                discount: CouponDiscount::Percent(Decimal::from(50)),
            })
            .await?;
        let store = SqliteOrderStore::new(db.clone());

        let mut with_coupon = draft(user, vec![priced(chair, 1_000, 1)]);
        with_coupon.coupon_code = Some("HALF".to_string());

        coupons.set_active("HALF", false).await?;
        let result = store.commit_order(with_coupon.clone()).await;
        assert!(matches!(result, Err(CommerceError::CouponWithdrawn(ref code)) if code == "HALF"));
        assert_eq!(stock_of(&db, chair).await?, 5);
        assert!(store.orders_for_user(user).await?.is_empty());

        coupons.set_active("HALF", true).await?;
        store.commit_order(with_coupon).await?;
        let listed = coupons.list().await?;
        assert_eq!(listed[0].used_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_regenerates_taken_order_number() -> TestResult {
        let db = memory_db().await?;
        let user = insert_user(&db, "ana").await?;
        let chair = insert_product(&db, "Chair", 1_000, 5).await?;
        let store = SqliteOrderStore::new(db.clone());

        let first = store.commit_order(draft(user, vec![priced(chair, 1_000, 1)])).await?;
        let second = store.commit_order(draft(user, vec![priced(chair, 1_000, 1)])).await?;

        assert_ne!(first.order_number, second.order_number);
        assert!(second.order_number.starts_with("ORD-20250101-"));
        assert!(store.find_order(user, &second.order_number).await?.is_some());
        assert_eq!(store.orders_for_user(user).await?.len(), 2);
        assert_eq!(stock_of(&db, chair).await?, 3);
        Ok(())
    }
}
