//! Error types for the typed store.

use crate::types::ValueKind;
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store not initialized")]
    NotInitialized,

    #[error("Store already initialized")]
    AlreadyInitialized,

    #[error("Key does not exist: {0}")]
    NotExistingKey(String),

    #[error("Invalid type for key {key}: expected {expected}, found {found}")]
    InvalidType {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Store is full (capacity {capacity})")]
    StoreFull { capacity: usize },

    #[error("Invalid color spec: {0:?}")]
    InvalidColorSpec(String),

    #[error("Invalid integer: {0:?}")]
    InvalidInteger(String),

    #[error("Store capacity must be at least 1")]
    InvalidCapacity,

    #[error("Watcher error: {0}")]
    Watcher(String),
}

impl StoreError {
    /// Whether the caller can carry on with the same store instance.
    ///
    /// `NotInitialized` and lifecycle misuse require the caller to
    /// (re-)initialize before anything else succeeds.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StoreError::NotInitialized
                | StoreError::AlreadyInitialized
                | StoreError::InvalidCapacity
                | StoreError::Watcher(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
