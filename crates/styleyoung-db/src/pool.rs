//! # Storefront Database Handle
//!
//! Opens the shop's SQLite file, applies migrations and hands out the
//! repositories.
//!
//! ```text
//!  DbConfig ──► Database::new ──► SqlitePool (WAL, FK on, busy_timeout)
//!                                     │
//!        ┌──────────────┬─────────────┼──────────────┬──────────────┐
//!        ▼              ▼             ▼              ▼              ▼
//!   categories()   products()     carts()        orders()      reports()
//!   sizes()        images()       users()
//! ```
//!
//! ## Writers
//! Readers run concurrently under WAL, but SQLite admits one writer at a
//! time. Every multi-statement write opens with [`begin_write`], which takes
//! the write lock up front (`BEGIN IMMEDIATE`). A deferred `BEGIN` that
//! reads first and upgrades later cannot wait on the busy handler and fails
//! with "database is locked" when two checkouts overlap.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::category::CategoryRepository;
use crate::repository::image::ImageRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::size::SizeRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the shop database lives and how many connections serve it.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("styleyoung.db").max_connections(8)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default: 5
    pub max_connections: u32,
    /// How long a writer waits for the lock before giving up. Default: 5s
    pub busy_timeout: Duration,
    /// How long a request waits for a free pool connection. Default: 30s
    pub acquire_timeout: Duration,
}

impl DbConfig {
    /// File-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Private in-memory database for tests. Each connection to
    /// `:memory:` is its own database, so the pool holds exactly one.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the shop database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // RESTRICT on categories/products relies on this
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        // One connection stays open for good; for `:memory:` it is the database.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        info!(max_connections = config.max_connections, "Database ready");
        Ok(Database { pool })
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Sizes carry the per-size stock.
    pub fn sizes(&self) -> SizeRepository {
        SizeRepository::new(self.pool.clone())
    }

    pub fn images(&self) -> ImageRepository {
        ImageRepository::new(self.pool.clone())
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Orders, including checkout.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Read-only dashboard and export queries.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Starts a write transaction holding SQLite's write lock from the first
/// statement. Waits up to the configured busy timeout for other writers.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_enforces_foreign_keys() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[tokio::test]
    async fn test_file_database_uses_wal_and_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(
            DbConfig::new(dir.path().join("shop.db"))
                .max_connections(3)
                .busy_timeout(Duration::from_millis(2500)),
        )
        .await
        .unwrap();

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(timeout, 2500);
        db.close().await;
    }

    #[tokio::test]
    async fn test_begin_write_takes_the_write_lock() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(
            DbConfig::new(dir.path().join("shop.db"))
                .max_connections(2)
                .busy_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap();

        let first = begin_write(db.pool()).await.unwrap();
        // A second writer cannot start while the first holds the lock
        assert!(begin_write(db.pool()).await.is_err());
        first.rollback().await.unwrap();
        begin_write(db.pool()).await.unwrap().commit().await.unwrap();
        db.close().await;
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/styleyoung-test.db")
            .max_connections(0)
            .busy_timeout(Duration::from_secs(1));
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
    }
}
