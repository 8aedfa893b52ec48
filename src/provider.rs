use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Column, ItemCursor, ItemValues, ResourceKind, Selection, SortOrder, Target};

/// Operations the inventory exposes to list views, editors and other callers.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Read rows. An item target replaces `selection` with its id; an empty
    /// `columns` slice selects every column.
    async fn query(
        &self,
        target: Target,
        columns: &[Column],
        selection: Option<Selection>,
        sort_order: Option<&SortOrder>,
    ) -> Result<ItemCursor>;

    /// Validate and insert a new row, returning its id.
    async fn insert(&self, values: &ItemValues) -> Result<i64>;

    /// Partially update the rows addressed by `target` and `selection`.
    async fn update(
        &self,
        target: Target,
        values: &ItemValues,
        selection: Option<Selection>,
    ) -> Result<u64>;

    /// Delete the rows addressed by `target` and `selection`.
    async fn delete(&self, target: Target, selection: Option<Selection>) -> Result<u64>;

    fn resource_kind(&self, target: Target) -> ResourceKind {
        target.resource_kind()
    }
}
