use sqlx::{Pool, Sqlite, migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::{Result, StoreError};

pub mod inventory_store;
pub mod inventory_tables;

pub use inventory_store::InventoryStore;
pub use inventory_tables::InventoryTable;

pub type DbPool = Pool<Sqlite>;

/// Process-wide database handle.
///
/// Construction does not touch the disk; the pool is opened and the schema
/// ensured on the first call to [`Database::pool`]. The handle stays open until
/// [`Database::close`] is called.
pub struct Database {
    config: Arc<Config>,
    pool: OnceCell<DbPool>,
}

impl Database {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            pool: OnceCell::new(),
        }
    }

    /// Get the connection pool, opening the database on first use.
    pub async fn pool(&self) -> Result<&DbPool> {
        self.pool
            .get_or_try_init(|| init_db_pool(&self.config))
            .await
    }

    pub fn is_open(&self) -> bool {
        self.pool.get().is_some_and(|pool| !pool.is_closed())
    }

    /// Schema version stamped into the open database.
    pub async fn schema_version(&self) -> Result<i64> {
        let pool = self.pool().await?;
        inventory_tables::schema_version(pool).await
    }

    /// Close the pool. Operations after this fail with a storage error.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Database {} closed", self.config.database_url);
        }
    }
}

/// Initialize the database connection pool
pub async fn init_db_pool(config: &Config) -> Result<DbPool> {
    let url = config.database_url.as_str();
    let unavailable = |e: sqlx::Error| StoreError::StorageUnavailable(e.to_string());

    // Create the database if it doesn't exist
    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::create_database(url).await.map_err(unavailable)?;
    }

    let mut options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    // Every in-memory connection is its own database, keep exactly one alive
    if config.is_in_memory() {
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect(url).await.map_err(unavailable)?;

    inventory_tables::ensure_schema(&pool, i64::from(config.schema_version)).await?;

    tracing::info!(
        "Database {} opened at schema version {}",
        url,
        config.schema_version
    );
    Ok(pool)
}
