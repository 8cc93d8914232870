//! Record store error types.

use thiserror::Error;

/// Errors raised by the item and element stores.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No item with this id.
    #[error("Item not found")]
    ItemNotFound { id: String },

    /// No element with this guid.
    #[error("Element not found")]
    ElementNotFound { guid: String },
}

impl StoreError {
    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ItemNotFound { .. } | StoreError::ElementNotFound { .. }
        )
    }

    /// The id or guid of the record this error is about.
    pub fn key(&self) -> &str {
        match self {
            StoreError::ItemNotFound { id } => id,
            StoreError::ElementNotFound { guid } => guid,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
