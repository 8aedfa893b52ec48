use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};

use crate::models::{Column, ItemValues};

/// A fully populated row of the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    #[sqlx(rename = "supplierName")]
    pub supplier_name: String,
    #[sqlx(rename = "supplierPhone")]
    pub supplier_phone: i64,
}

impl InventoryItem {
    /// Values to write this item back through the store, without its id.
    pub fn to_values(&self) -> ItemValues {
        ItemValues::new()
            .name(self.name.clone())
            .price(self.price)
            .quantity(self.quantity)
            .supplier_name(self.supplier_name.clone())
            .supplier_phone(self.supplier_phone)
    }
}

/// A row as returned by a projected query; unrequested columns stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_phone: Option<i64>,
}

impl ItemRow {
    pub(crate) fn from_sqlite_row(row: &SqliteRow, columns: &[Column]) -> Result<Self, sqlx::Error> {
        let mut item = ItemRow::default();

        for column in columns {
            let name = column.column_name();
            match column {
                Column::Id => item.id = row.try_get(name)?,
                Column::Name => item.name = row.try_get(name)?,
                Column::Price => item.price = row.try_get(name)?,
                Column::Quantity => item.quantity = row.try_get(name)?,
                Column::SupplierName => item.supplier_name = row.try_get(name)?,
                Column::SupplierPhone => item.supplier_phone = row.try_get(name)?,
            }
        }

        Ok(item)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<InventoryItem> for ItemRow {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: Some(item.id),
            name: Some(item.name),
            price: Some(item.price),
            quantity: Some(item.quantity),
            supplier_name: Some(item.supplier_name),
            supplier_phone: Some(item.supplier_phone),
        }
    }
}

/// Result of a query.
///
/// The rows are read when the query runs and can be scanned any number of
/// times afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ItemCursor {
    rows: Vec<ItemRow>,
}

impl ItemCursor {
    pub fn new(rows: Vec<ItemRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&ItemRow> {
        self.rows.first()
    }

    pub fn get(&self, position: usize) -> Option<&ItemRow> {
        self.rows.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemRow> {
        self.rows.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.rows.iter().map(ItemRow::to_json).collect())
    }
}

impl<'a> IntoIterator for &'a ItemCursor {
    type Item = &'a ItemRow;
    type IntoIter = std::slice::Iter<'a, ItemRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ItemCursor {
    type Item = ItemRow;
    type IntoIter = std::vec::IntoIter<ItemRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
