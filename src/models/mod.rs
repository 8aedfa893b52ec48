pub mod change_event;
pub mod inventory_item;
pub mod query;
pub mod target;
pub mod values;

pub use change_event::{ChangeEvent, ChangeKind};
pub use inventory_item::{InventoryItem, ItemCursor, ItemRow};
pub use query::{Direction, Selection, SortOrder};
pub use target::{CONTENT_AUTHORITY, ResourceKind, Target};
pub use values::{Column, Field, ItemValues, SqlValue};
