//! Database connection and migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

use crate::{DbConfig, DbError};

/// Pooled SQLite database.
///
/// Cheap to clone; every clone shares the same pool.
///
/// Write transactions must issue a write as their first statement. SQLite
/// then takes the write lock up front, so a transaction never has to upgrade
/// a read lock while another writer holds the database.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open the database described by `config`, creating the file if needed.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|source| DbError::InvalidUrl {
                url: config.url.clone(),
                source,
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(DbError::Open)?;

        info!(url = %config.url, max_connections = config.max_connections, "database connected");

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|source| DbError::InvalidUrl {
                url: "sqlite::memory:".to_string(),
                source,
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(DbError::Open)?;

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("migrations applied");
        Ok(())
    }

    /// Start a transaction. It rolls back if dropped without `commit`.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, DbError> {
        Ok(self.pool.begin().await?)
    }

    /// The underlying pool, for single-statement reads.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Get current Unix timestamp.
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[tokio::test]
    async fn test_in_memory_migrates() -> TestResult {
        let db = Db::in_memory().await?;
        db.migrate().await?;

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(db.pool())
                .await?;
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        for expected in ["orders", "order_items", "order_status_history", "products", "coupons", "users"] {
            assert!(names.contains(&expected), "missing table {expected}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() -> TestResult {
        let db = Db::in_memory().await?;
        db.migrate().await?;
        db.migrate().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() -> TestResult {
        let db = Db::in_memory().await?;
        db.migrate().await?;

        let result = sqlx::query(
            "INSERT INTO order_items (order_id, product_name, product_sku, product_price_cents, quantity, subtotal_cents)
             VALUES (999, 'Ghost', 'GHOST', 100, 1, 100)",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_check_constraint() -> TestResult {
        let db = Db::in_memory().await?;
        db.migrate().await?;

        let result = sqlx::query(
            "INSERT INTO products (name, slug, sku, price_cents, stock, created_at, updated_at)
             VALUES ('Chair', 'chair', 'CHAIR', 100, -1, 0, 0)",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_file_database_uses_wal() -> TestResult {
        let dir = tempfile::tempdir()?;
        let db = Db::connect(&DbConfig::for_file(dir.path().join("store.db"))).await?;

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await?;

        assert_eq!(mode.to_lowercase(), "wal");
        db.close().await;
        Ok(())
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        // 2024-01-01
        assert!(current_timestamp() > 1_704_067_200);
    }
}
