//! Errors surfaced by inventory operations.

use stocktally_core::DomainError;
use thiserror::Error;

use crate::storage::StorageError;

pub type InventoryResult<T> = Result<T, InventoryError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Rejected by a domain rule; nothing was changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The in-memory list changed but could not be written back.
    #[error("inventory changed but was not saved: {0}")]
    Storage(#[from] StorageError),
}

impl InventoryError {
    /// Whether the in-memory list was mutated before the error occurred.
    pub fn mutation_applied(&self) -> bool {
        matches!(self, InventoryError::Storage(_))
    }
}
