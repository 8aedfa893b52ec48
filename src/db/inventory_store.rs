use async_trait::async_trait;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use std::sync::Arc;

use crate::{
    db::{Database, DbPool, InventoryTable},
    error::{Result, StoreError},
    handlers::{ChangeNotifier, Subscription, SubscriptionError},
    models::{
        ChangeEvent, Column, Field, InventoryItem, ItemCursor, ItemRow, ItemValues, Selection,
        SortOrder, SqlValue, Target,
    },
    provider::InventoryProvider,
};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Inventory store for database operations
pub struct InventoryStore {
    database: Arc<Database>,
    notifier: Arc<ChangeNotifier>,
}

impl InventoryStore {
    /// Create a new InventoryStore on top of the shared database handle
    pub fn new(database: Arc<Database>) -> Self {
        Self {
            database,
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    async fn pool(&self) -> Result<&DbPool> {
        self.database.pool().await
    }

    /// Register for change notifications on `target`
    pub async fn subscribe(&self, target: Target) -> Subscription {
        self.notifier.subscribe(target).await
    }

    /// Stop delivering notifications to `subscription`
    pub async fn unsubscribe(
        &self,
        subscription: &Subscription,
    ) -> std::result::Result<(), SubscriptionError> {
        self.notifier.unsubscribe(subscription.id()).await
    }

    /// Get an item by ID
    pub async fn get_item(&self, id: i64) -> Result<Option<InventoryItem>> {
        let query = format!(
            "SELECT * FROM {} WHERE {} = ?",
            InventoryTable::TABLE_NAME,
            InventoryTable::COLUMN_ID
        );

        let item = sqlx::query_as::<_, InventoryItem>(&query)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;

        Ok(item)
    }

    /// Get a list of all items, oldest first
    pub async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        let query = format!(
            "SELECT * FROM {} ORDER BY {} ASC",
            InventoryTable::TABLE_NAME,
            InventoryTable::COLUMN_ID
        );

        let items = sqlx::query_as::<_, InventoryItem>(&query)
            .fetch_all(self.pool().await?)
            .await?;

        Ok(items)
    }

    /// Sell one unit of an item, returning the remaining quantity
    pub async fn sell_item(&self, id: i64) -> Result<i64> {
        let query = format!(
            "UPDATE {table} SET {quantity} = {quantity} - 1 \
             WHERE {id} = ? AND {quantity} > 0 RETURNING {quantity}",
            table = InventoryTable::TABLE_NAME,
            quantity = InventoryTable::COLUMN_QUANTITY,
            id = InventoryTable::COLUMN_ID
        );

        let remaining = sqlx::query_scalar::<_, i64>(&query)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;

        match remaining {
            Some(remaining) => {
                self.notify_item_updated(id).await;
                Ok(remaining)
            }
            None => Err(self.missing_or_out_of_stock(id).await?),
        }
    }

    /// Add `amount` units to an item's stock, never going below zero
    pub async fn restock_item(&self, id: i64, amount: i64) -> Result<i64> {
        let query = format!(
            "UPDATE {table} SET {quantity} = MIN(MAX({quantity} + ?, 0), ?) \
             WHERE {id} = ? RETURNING {quantity}",
            table = InventoryTable::TABLE_NAME,
            quantity = InventoryTable::COLUMN_QUANTITY,
            id = InventoryTable::COLUMN_ID
        );

        let quantity = sqlx::query_scalar::<_, i64>(&query)
            .bind(amount)
            // Integer overflow yields a REAL in SQLite, clamp it back
            .bind(i64::MAX)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?
            .ok_or(StoreError::ItemNotFound(id))?;

        self.notify_item_updated(id).await;
        Ok(quantity)
    }

    async fn notify_item_updated(&self, id: i64) {
        tracing::debug!("stock of item {} changed", id);
        self.notifier
            .notify(ChangeEvent::updated(Target::Item(id), 1))
            .await;
    }

    /// Explain why a conditional stock write matched no row.
    async fn missing_or_out_of_stock(&self, id: i64) -> Result<StoreError> {
        Ok(match self.get_item(id).await? {
            Some(_) => StoreError::OutOfStock(id),
            None => StoreError::ItemNotFound(id),
        })
    }

    /// Delete every row in the table
    pub async fn delete_all(&self) -> Result<u64> {
        let rows = self.delete(Target::Collection, None).await?;
        tracing::info!("{} rows deleted from {}", rows, InventoryTable::TABLE_NAME);
        Ok(rows)
    }

    /// Insert the catalog's placeholder item
    pub async fn insert_sample_item(&self) -> Result<i64> {
        self.insert(&sample_item_values()).await
    }
}

#[async_trait]
impl InventoryProvider for InventoryStore {
    async fn query(
        &self,
        target: Target,
        columns: &[Column],
        selection: Option<Selection>,
        sort_order: Option<&SortOrder>,
    ) -> Result<ItemCursor> {
        let columns: Vec<Column> = if columns.is_empty() {
            Column::ALL.to_vec()
        } else {
            columns.to_vec()
        };

        let column_list = columns
            .iter()
            .map(|column| column.column_name())
            .collect::<Vec<_>>()
            .join(", ");

        let mut query = format!("SELECT {} FROM {}", column_list, InventoryTable::TABLE_NAME);
        let mut args = Vec::new();

        if let Some(selection) = resolve_selection(target, selection) {
            selection.apply(&mut query, &mut args);
        }

        if let Some(order) = sort_order.filter(|order| !order.is_empty()) {
            query.push_str(" ORDER BY ");
            query.push_str(&order.to_sql());
        }

        let rows = bind_args(sqlx::query(&query), &args)
            .fetch_all(self.pool().await?)
            .await?;

        let items = rows
            .iter()
            .map(|row| ItemRow::from_sqlite_row(row, &columns))
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("query {} returned {} rows", target, items.len());
        Ok(ItemCursor::new(items))
    }

    async fn insert(&self, values: &ItemValues) -> Result<i64> {
        let values = validate_insert(values)?;

        let columns = values
            .iter()
            .map(|(field, _)| field.column_name())
            .collect::<Vec<_>>();
        let placeholders = vec!["?"; columns.len()];

        let query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            InventoryTable::TABLE_NAME,
            columns.join(", "),
            placeholders.join(", ")
        );
        let args = values.iter().map(|(_, value)| value.clone()).collect::<Vec<_>>();

        let id = match bind_args(sqlx::query(&query), &args)
            .execute(self.pool().await?)
            .await
        {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                tracing::error!("Failed to insert row for {}: {}", Target::Collection, e);
                return Err(StoreError::Storage(e));
            }
        };

        tracing::debug!("inserted item {}", id);
        self.notifier.notify(ChangeEvent::inserted(id)).await;

        Ok(id)
    }

    async fn update(
        &self,
        target: Target,
        values: &ItemValues,
        selection: Option<Selection>,
    ) -> Result<u64> {
        let values = validate_update(values)?;

        // Nothing to write, leave the database alone
        if values.is_empty() {
            return Ok(0);
        }

        let assignments = values
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column_name()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut query = format!("UPDATE {} SET {}", InventoryTable::TABLE_NAME, assignments);
        let mut args = values.iter().map(|(_, value)| value.clone()).collect::<Vec<_>>();

        if let Some(selection) = resolve_selection(target, selection) {
            selection.apply(&mut query, &mut args);
        }

        let rows = bind_args(sqlx::query(&query), &args)
            .execute(self.pool().await?)
            .await?
            .rows_affected();

        tracing::debug!("update {} touched {} rows", target, rows);
        if rows > 0 {
            self.notifier.notify(ChangeEvent::updated(target, rows)).await;
        }

        Ok(rows)
    }

    async fn delete(&self, target: Target, selection: Option<Selection>) -> Result<u64> {
        let mut query = format!("DELETE FROM {}", InventoryTable::TABLE_NAME);
        let mut args = Vec::new();

        if let Some(selection) = resolve_selection(target, selection) {
            selection.apply(&mut query, &mut args);
        }

        let rows = bind_args(sqlx::query(&query), &args)
            .execute(self.pool().await?)
            .await?
            .rows_affected();

        tracing::debug!("delete {} removed {} rows", target, rows);
        if rows > 0 {
            self.notifier.notify(ChangeEvent::deleted(target, rows)).await;
        }

        Ok(rows)
    }
}

/// An item target always addresses its own row; the caller's selection only
/// applies to the collection.
fn resolve_selection(target: Target, selection: Option<Selection>) -> Option<Selection> {
    match target {
        Target::Collection => selection,
        Target::Item(id) => {
            if selection.as_ref().is_some_and(|s| !s.is_empty()) {
                tracing::debug!("selection ignored for item target {}", id);
            }
            Some(Selection::by_id(id))
        }
    }
}

fn bind_args<'q>(mut query: SqliteQuery<'q>, args: &[SqlValue]) -> SqliteQuery<'q> {
    for arg in args {
        query = match arg {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(value) => query.bind(*value),
            SqlValue::Text(text) => query.bind(text.clone()),
        };
    }
    query
}

fn required_text(values: &ItemValues, field: Field) -> Result<String> {
    values
        .get_as_text(field)
        .filter(|text| !text.trim().is_empty())
        .ok_or(StoreError::Validation(field))
}

fn required_non_negative(values: &ItemValues, field: Field) -> Result<i64> {
    values
        .get_as_integer(field)
        .filter(|value| *value >= 0)
        .ok_or(StoreError::Validation(field))
}

/// Strict checks for a new row. Supplier phone is the only optional field.
fn validate_insert(values: &ItemValues) -> Result<ItemValues> {
    let name = required_text(values, Field::Name)?;
    let price = required_non_negative(values, Field::Price)?;
    let quantity = required_non_negative(values, Field::Quantity)?;
    let supplier_name = required_text(values, Field::SupplierName)?;
    let supplier_phone = values
        .get_as_integer(Field::SupplierPhone)
        .filter(|phone| *phone >= 0)
        .unwrap_or(0);

    Ok(ItemValues::new()
        .name(name)
        .price(price)
        .quantity(quantity)
        .supplier_name(supplier_name)
        .supplier_phone(supplier_phone))
}

/// Lenient checks for a partial write: names must stay non-empty, invalid
/// numbers become 0.
fn validate_update(values: &ItemValues) -> Result<ItemValues> {
    let mut normalized = ItemValues::new();

    for (field, value) in values.iter() {
        match field {
            Field::Name | Field::SupplierName => {
                let text = value
                    .as_text()
                    .filter(|text| !text.trim().is_empty())
                    .ok_or(StoreError::Validation(field))?;
                normalized.put(field, text);
            }
            Field::Price | Field::Quantity | Field::SupplierPhone => {
                let number = value.as_integer().filter(|number| *number >= 0).unwrap_or(0);
                normalized.put(field, number);
            }
        }
    }

    Ok(normalized)
}

pub fn sample_item_values() -> ItemValues {
    ItemValues::new()
        .name("Kraken V2")
        .price(20)
        .quantity(1)
        .supplier_name("Razer")
        .supplier_phone(0)
}
