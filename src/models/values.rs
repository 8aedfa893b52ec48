use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::db::InventoryTable;

/// A writable column of the inventory table.
///
/// There is no `id` field: ids are assigned by the store and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Price,
    Quantity,
    SupplierName,
    SupplierPhone,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Price,
        Field::Quantity,
        Field::SupplierName,
        Field::SupplierPhone,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Field::Name => InventoryTable::COLUMN_NAME,
            Field::Price => InventoryTable::COLUMN_PRICE,
            Field::Quantity => InventoryTable::COLUMN_QUANTITY,
            Field::SupplierName => InventoryTable::COLUMN_SUPPLIER_NAME,
            Field::SupplierPhone => InventoryTable::COLUMN_SUPPLIER_PHONE,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A readable column, used for projections and sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Id,
    Name,
    Price,
    Quantity,
    SupplierName,
    SupplierPhone,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Name,
        Column::Price,
        Column::Quantity,
        Column::SupplierName,
        Column::SupplierPhone,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Column::Id => InventoryTable::COLUMN_ID,
            Column::Name => InventoryTable::COLUMN_NAME,
            Column::Price => InventoryTable::COLUMN_PRICE,
            Column::Quantity => InventoryTable::COLUMN_QUANTITY,
            Column::SupplierName => InventoryTable::COLUMN_SUPPLIER_NAME,
            Column::SupplierPhone => InventoryTable::COLUMN_SUPPLIER_PHONE,
        }
    }
}

impl From<Field> for Column {
    fn from(field: Field) -> Self {
        match field {
            Field::Name => Column::Name,
            Field::Price => Column::Price,
            Field::Quantity => Column::Quantity,
            Field::SupplierName => Column::SupplierName,
            Field::SupplierPhone => Column::SupplierPhone,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A loosely typed value as handed over by a caller or bound into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    /// Interpret the value as an integer. Text is parsed, null yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(value) => Some(*value),
            SqlValue::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Interpret the value as text. Integers are formatted, null yields `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(value) => Some(value.to_string()),
            SqlValue::Text(text) => Some(text.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// The set of column values passed to insert and update.
///
/// Only keys that are present take part in a write; a key may be present with
/// a null or unparsable value, which the store then validates or coerces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemValues {
    values: BTreeMap<Field, SqlValue>,
}

impl ItemValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, field: Field, value: impl Into<SqlValue>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with(mut self, field: Field, value: impl Into<SqlValue>) -> Self {
        self.put(field, value);
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.with(Field::Name, name.into())
    }

    pub fn price(self, price: i64) -> Self {
        self.with(Field::Price, price)
    }

    pub fn quantity(self, quantity: i64) -> Self {
        self.with(Field::Quantity, quantity)
    }

    pub fn supplier_name(self, supplier_name: impl Into<String>) -> Self {
        self.with(Field::SupplierName, supplier_name.into())
    }

    pub fn supplier_phone(self, supplier_phone: i64) -> Self {
        self.with(Field::SupplierPhone, supplier_phone)
    }

    pub fn get(&self, field: Field) -> Option<&SqlValue> {
        self.values.get(&field)
    }

    pub fn get_as_integer(&self, field: Field) -> Option<i64> {
        self.get(field).and_then(SqlValue::as_integer)
    }

    pub fn get_as_text(&self, field: Field) -> Option<String> {
        self.get(field).and_then(SqlValue::as_text)
    }

    pub fn contains_key(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &SqlValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }
}

impl FromIterator<(Field, SqlValue)> for ItemValues {
    fn from_iter<I: IntoIterator<Item = (Field, SqlValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
