//! Coupon storage.

use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{query, query_as, FromRow, Row};
use storefront_db::{current_timestamp, Db};
use tracing::{debug, info};

use crate::coupons::{normalize_code, Coupon, CouponCheck, CouponDiscount, NewCoupon};
use crate::error::CommerceError;

const COUPON_COLUMNS: &str =
    "id, code, discount_type, discount_value, is_active, used_count, created_at";

/// Admin and lookup operations over the coupon table.
#[derive(Debug, Clone)]
pub struct CouponBook {
    db: Db,
}

impl CouponBook {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a coupon. Codes are unique.
    pub async fn create(&self, coupon: NewCoupon) -> Result<Coupon, CommerceError> {
        let code = coupon.code.trim();
        if code.is_empty() {
            return Err(CommerceError::ValidationError("coupon code is required".to_string()));
        }
        coupon.discount.validate()?;

        let mut value = coupon.discount.value();
        value.rescale(2);

        let created: Coupon = query_as(&format!(
            "INSERT INTO coupons (code, discount_type, discount_value, is_active, used_count, created_at)
             VALUES (?1, ?2, ?3, 1, 0, ?4)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(code)
        .bind(coupon.discount.kind())
        .bind(value.to_string())
        .bind(current_timestamp())
        .fetch_one(self.db.pool())
        .await?;

        info!(code = %created.code, kind = created.discount.kind(), "coupon created");
        Ok(created)
    }

    /// All coupons, newest first.
    pub async fn list(&self) -> Result<Vec<Coupon>, CommerceError> {
        let coupons = query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(coupons)
    }

    /// Enable or disable a coupon.
    pub async fn set_active(&self, code: &str, active: bool) -> Result<(), CommerceError> {
        let rows = query("UPDATE coupons SET is_active = ?1 WHERE code = ?2")
            .bind(active)
            .bind(code.trim())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(CommerceError::CouponNotFound(code.to_string()));
        }
        info!(code, active, "coupon updated");
        Ok(())
    }

    /// Read-only validity probe. Reserves nothing.
    pub async fn check(&self, code: &str) -> Result<CouponCheck, CommerceError> {
        let coupon = match normalize_code(Some(code)) {
            Some(code) => find_active(self.db.pool(), code).await?,
            None => None,
        };
        Ok(CouponCheck::from_lookup(coupon.as_ref()))
    }
}

/// Look up an active coupon by exact code.
pub(crate) async fn find_active<'e, E>(executor: E, code: &str) -> Result<Option<Coupon>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let coupon: Option<Coupon> = query_as(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1 AND is_active = 1"
    ))
    .bind(code)
    .fetch_optional(executor)
    .await?;

    debug!(code, found = coupon.is_some(), "coupon lookup");
    Ok(coupon)
}

impl<'r> FromRow<'r, SqliteRow> for Coupon {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("discount_type")?;
        let value: String = row.try_get("discount_value")?;
        let discount =
            CouponDiscount::from_parts(&kind, &value).map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_value".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            discount,
            is_active: row.try_get("is_active")?,
            used_count: row.try_get("used_count")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
