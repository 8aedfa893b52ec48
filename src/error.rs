use thiserror::Error;

use crate::models::Field;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Item requires a valid {0}")]
    Validation(Field),

    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Item {0} is out of stock")]
    OutOfStock(i64),
}

impl StoreError {
    /// Errors the caller can fix by changing its input and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::ItemNotFound(_) | StoreError::OutOfStock(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(StoreError::Validation(Field::Name).is_recoverable());
        assert!(StoreError::OutOfStock(1).is_recoverable());
        assert!(StoreError::ItemNotFound(1).is_recoverable());
        assert!(!StoreError::StorageUnavailable("disk full".to_string()).is_recoverable());
        assert!(!StoreError::Storage(sqlx::Error::PoolClosed).is_recoverable());
    }
}
