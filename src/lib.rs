//! SQLite-backed data-access layer for a single-table inventory.
//!
//! [`InventoryStore`] validates input, resolves a [`Target`] (the whole table or
//! one row) to a concrete statement, executes it against the shared
//! [`Database`] and notifies subscribers after every successful write.
//!
//! ```rust,ignore
//! use inventory_store::{Config, Database, InventoryProvider, InventoryStore, ItemValues, Target};
//! use std::sync::Arc;
//!
//! let database = Arc::new(Database::new(Config::from_env()?));
//! let store = InventoryStore::new(database.clone());
//!
//! let id = store
//!     .insert(&ItemValues::new().name("Kraken V2").price(20).quantity(1).supplier_name("Razer"))
//!     .await?;
//! let rows = store.query(Target::item(id), &[], None, None).await?;
//!
//! database.close().await;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod provider;

pub use config::{Config, ConfigError};
pub use db::{Database, InventoryStore, InventoryTable};
pub use error::{Result, StoreError};
pub use handlers::{ChangeNotifier, Subscription, SubscriptionError, SubscriptionId};
pub use models::{
    ChangeEvent, ChangeKind, Column, Direction, Field, InventoryItem, ItemCursor, ItemRow,
    ItemValues, ResourceKind, Selection, SortOrder, SqlValue, Target,
};
pub use provider::InventoryProvider;

/// Target addressing every row of the inventory.
pub fn collection_target() -> Target {
    Target::collection()
}

/// Target addressing the row with `id`.
pub fn item_target(id: i64) -> Target {
    Target::item(id)
}
