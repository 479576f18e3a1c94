//! SQLite database layer for the storefront.
//!
//! Wraps a `sqlx` connection pool with the settings every storefront service
//! relies on: WAL journaling, a busy timeout so competing writers wait instead
//! of failing, and enforced foreign keys. The schema ships as embedded
//! migrations.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_db::{Db, DbConfig};
//!
//! let db = Db::connect(&DbConfig::default()).await?;
//! db.migrate().await?;
//!
//! let mut tx = db.begin().await?;
//! sqlx::query("UPDATE products SET views = views + 1 WHERE id = ?1")
//!     .bind(1_i64)
//!     .execute(&mut *tx)
//!     .await?;
//! tx.commit().await?;
//! ```

mod config;
mod db;
mod error;

pub use config::DbConfig;
pub use db::{current_timestamp, Db};
pub use error::DbError;

/// Re-exported so dependents name the same transaction type.
pub type Tx = sqlx::Transaction<'static, sqlx::Sqlite>;
