use crate::db::DbPool;
use crate::error::{Result, StoreError};

/// Provides constants and utilities for working with
/// the "inventory" database table.
pub struct InventoryTable;

impl InventoryTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "inventory";

    /// The column name for the auto-assigned primary key of an item.
    pub const COLUMN_ID: &'static str = "id";

    /// The column name for storing the product name.
    pub const COLUMN_NAME: &'static str = "name";

    /// The column name for storing the base price of an item.
    pub const COLUMN_PRICE: &'static str = "price";

    /// The column name for storing how many of an item are in stock.
    pub const COLUMN_QUANTITY: &'static str = "quantity";

    /// The column name for storing the name of the item's supplier.
    pub const COLUMN_SUPPLIER_NAME: &'static str = "supplierName";

    /// The column name for storing the supplier's phone number.
    pub const COLUMN_SUPPLIER_PHONE: &'static str = "supplierPhone";

    /// SQL statement for creating the inventory table with the defined schema.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY AUTOINCREMENT,
                {} TEXT NOT NULL,
                {} INTEGER,
                {} INTEGER DEFAULT 0,
                {} TEXT NOT NULL,
                {} INTEGER
            )",
            Self::TABLE_NAME,
            Self::COLUMN_ID,
            Self::COLUMN_NAME,
            Self::COLUMN_PRICE,
            Self::COLUMN_QUANTITY,
            Self::COLUMN_SUPPLIER_NAME,
            Self::COLUMN_SUPPLIER_PHONE
        )
    }

    /// SQL statement for dropping the inventory table.
    pub fn drop_table() -> String {
        format!("DROP TABLE IF EXISTS {}", Self::TABLE_NAME)
    }
}

/// Create the inventory table if it does not exist yet.
pub async fn create_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(&InventoryTable::create_table())
        .execute(pool)
        .await
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

    Ok(())
}

/// Drop and recreate the inventory table, discarding every row.
pub async fn reset_schema(pool: &DbPool) -> Result<()> {
    let unavailable = |e: sqlx::Error| StoreError::StorageUnavailable(e.to_string());

    let mut tx = pool.begin().await.map_err(unavailable)?;
    sqlx::query(&InventoryTable::drop_table())
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;
    sqlx::query(&InventoryTable::create_table())
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;
    tx.commit().await.map_err(unavailable)?;

    tracing::info!("Inventory table dropped and recreated");
    Ok(())
}

/// Read the schema version stamped into the database file.
pub async fn schema_version(pool: &DbPool) -> Result<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

    Ok(version)
}

async fn set_schema_version(pool: &DbPool, version: i64) -> Result<()> {
    // PRAGMA values cannot be bound
    sqlx::query(&format!("PRAGMA user_version = {}", version))
        .execute(pool)
        .await
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

    Ok(())
}

/// Bring the schema to `version`.
///
/// A fresh file gets the table created, an older version is dropped and
/// recreated (all rows are lost), and a newer version than the running code
/// knows about is refused.
pub async fn ensure_schema(pool: &DbPool, version: i64) -> Result<()> {
    let current = schema_version(pool).await?;

    if current == 0 {
        create_schema(pool).await?;
        set_schema_version(pool, version).await?;
        tracing::info!("Inventory schema created at version {}", version);
    } else if current < version {
        tracing::warn!(
            "Inventory schema upgrade {} -> {}, existing rows are discarded",
            current,
            version
        );
        reset_schema(pool).await?;
        set_schema_version(pool, version).await?;
    } else if current > version {
        return Err(StoreError::StorageUnavailable(format!(
            "database schema version {} is newer than supported version {}",
            current, version
        )));
    } else {
        create_schema(pool).await?;
    }

    Ok(())
}
