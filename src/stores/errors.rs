//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors shared by every store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Backing service cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Write or read failed
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Storage("Lock poisoned".to_string())
    }
}
