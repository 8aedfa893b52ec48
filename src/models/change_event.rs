use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Target;

/// Kind of mutation that triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChangeKind {
    /// A row was inserted with the given id
    Inserted { id: i64 },
    /// One or more rows were updated
    Updated,
    /// One or more rows were deleted
    Deleted,
}

/// Notification that cached views of a target are stale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Target the mutating operation was issued against
    pub target: Target,
    /// What happened
    pub kind: ChangeKind,
    /// Number of rows written
    pub rows: u64,
    /// Timestamp when the write committed
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(target: Target, kind: ChangeKind, rows: u64) -> Self {
        Self {
            target,
            kind,
            rows,
            timestamp: Utc::now(),
        }
    }

    pub fn inserted(id: i64) -> Self {
        Self::new(Target::Collection, ChangeKind::Inserted { id }, 1)
    }

    pub fn updated(target: Target, rows: u64) -> Self {
        Self::new(target, ChangeKind::Updated, rows)
    }

    pub fn deleted(target: Target, rows: u64) -> Self {
        Self::new(target, ChangeKind::Deleted, rows)
    }
}
