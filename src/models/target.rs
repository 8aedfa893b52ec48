use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::InventoryTable;
use crate::error::StoreError;

/// Authority used when a target is rendered as a content path.
pub const CONTENT_AUTHORITY: &str = "inventory.store";

const CONTENT_SCHEME: &str = "content://";

/// What an operation addresses: the whole table or a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    Collection,
    Item(i64),
}

impl Target {
    pub fn collection() -> Self {
        Target::Collection
    }

    pub fn item(id: i64) -> Self {
        Target::Item(id)
    }

    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            Target::Collection => ResourceKind::Collection,
            Target::Item(_) => ResourceKind::Item,
        }
    }

    pub fn item_id(&self) -> Option<i64> {
        match self {
            Target::Collection => None,
            Target::Item(id) => Some(*id),
        }
    }

    /// Path relative to the authority, e.g. `inventory/7`.
    pub fn path(&self) -> String {
        match self {
            Target::Collection => InventoryTable::TABLE_NAME.to_string(),
            Target::Item(id) => format!("{}/{}", InventoryTable::TABLE_NAME, id),
        }
    }

    /// Whether an observer registered on `self` cares about a change to `changed`.
    ///
    /// Collection observers see everything; item observers see their own row
    /// and any collection-wide change.
    pub fn observes(&self, changed: &Target) -> bool {
        match (self, changed) {
            (Target::Collection, _) | (_, Target::Collection) => true,
            (Target::Item(watched), Target::Item(id)) => watched == id,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", CONTENT_SCHEME, CONTENT_AUTHORITY, self.path())
    }
}

impl FromStr for Target {
    type Err = StoreError;

    /// Accepts `inventory`, `inventory/<id>` and the same paths prefixed with
    /// `content://<authority>/`. Anything else is an unsupported target.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || StoreError::UnsupportedTarget(s.to_string());

        let path = match s.strip_prefix(CONTENT_SCHEME) {
            Some(rest) => rest
                .strip_prefix(CONTENT_AUTHORITY)
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(unsupported)?,
            None => s,
        };

        let mut segments = path.split('/');
        if segments.next() != Some(InventoryTable::TABLE_NAME) {
            return Err(unsupported());
        }

        match (segments.next(), segments.next()) {
            (None, _) => Ok(Target::Collection),
            (Some(id), None) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => id
                .parse()
                .map(Target::Item)
                .map_err(|_| unsupported()),
            _ => Err(unsupported()),
        }
    }
}

/// Classification of a target, the equivalent of a dir/item MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Collection,
    Item,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Collection => "collection",
            ResourceKind::Item => "item",
        }
    }

    pub fn mime_type(&self) -> String {
        let base = match self {
            ResourceKind::Collection => "vnd.cursor.dir",
            ResourceKind::Item => "vnd.cursor.item",
        };
        format!("{}/{}/{}", base, CONTENT_AUTHORITY, InventoryTable::TABLE_NAME)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
