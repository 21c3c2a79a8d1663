//! # Database Pool Management
//!
//! Connection pool creation and the repository registry.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::load("smartpos.toml") ← file + env overrides                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.categories()            → BaseRepository<Category, CategoryVm>     │
//! │  db.products()              → BaseRepository<Product, ProductVm>       │
//! │  db.repository::<E, M>()    → any other entity / view model pair       │
//! │  db.query::<E>()            → raw EntityQuery<E>                        │
//! │                                                                         │
//! │  Repositories are cheap handles (one pool clone each).                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases use SQLite WAL (Write-Ahead Logging) mode:
//! - Readers don't block writers
//! - Writers don't block readers
//! - Better crash recovery

use std::str::FromStr;
use std::time::Duration;

use smartpos_core::{CopyFields, EntityVm, Validate};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::base::BaseRepository;
use crate::source::EntityQuery;
use crate::table::SqlEntity;

/// Main database handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::load("smartpos.toml")?).await?;
///
/// let page = db.categories().get_page(0, 10, Find::new()).await?;
/// let coke = db.products().find_by_sku("COKE-330").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Validates the configuration
    /// 2. Creates the database file if it doesn't exist
    /// 3. Configures SQLite:
    ///    - WAL mode for concurrent reads (file databases)
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 4. Creates the connection pool
    /// 5. Runs migrations (if enabled)
    ///
    /// ## Example
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::new("./smartpos.db")).await?;
    /// ```
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        config.validate()?;

        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let base_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let connect_options = base_options
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout));

        if config.is_in_memory() {
            // Every connection to :memory: is its own database; keep the one
            // connection open for the life of the pool.
            pool_options = pool_options
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Wraps an existing pool. No migrations are run.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Database { pool }
    }

    /// Runs database migrations.
    ///
    /// ## When To Call
    /// - Automatically called by `new()` if `run_migrations` is true
    /// - Manually call when migrations are disabled in config
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Embedded vs applied migration counts.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// ## Usage
    /// For advanced queries not covered by repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A composable query over live rows of `E`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let cheap = db
    ///     .query::<Product>()
    ///     .filter(Filter::lt(ProductColumn::PriceCents, 100))
    ///     .order_by(ProductColumn::Name)
    ///     .paginate(0, 20)
    ///     .await?;
    /// ```
    pub fn query<E: SqlEntity>(&self) -> EntityQuery<E> {
        EntityQuery::new(self.pool.clone())
    }

    /// The generic repository for entity `E` and view model `M`.
    pub fn repository<E, M>(&self) -> BaseRepository<E, M>
    where
        E: SqlEntity + CopyFields<E> + Validate,
        M: EntityVm<Id = E::Id> + From<E>,
    {
        BaseRepository::new(self.pool.clone())
    }

    /// Returns the category repository.
    pub fn categories(&self) -> CategoryRepository {
        self.repository()
    }

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let products = db.products().search("coke", 20).await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        self.repository()
    }

    /// Closes the database connection pool.
    ///
    /// ## Note
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let status = db.migration_status().await.unwrap();
        assert!(status.total > 0);
        assert_eq!(status.applied, status.total);
        assert!(status.is_up_to_date());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let err = Database::new(DbConfig::in_memory().max_connections(0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConfigFailed(_)));
    }

    #[tokio::test]
    async fn test_without_migrations_has_no_tables() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        assert!(db.categories().any(None).await.is_err());

        db.run_migrations().await.unwrap();
        assert!(!db.categories().any(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_pool_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }
}
