//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, user-facing failures (validation,
/// positional lookups, empty exports). Persistence concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A candidate failed validation (e.g. a required field is blank).
    ///
    /// The payload is the message shown to the user.
    #[error("{0}")]
    Validation(String),

    /// A positional lookup fell outside `[0, len)`.
    #[error("index {index} is out of range (list has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    /// An export was requested while there is nothing to export.
    #[error("{0}")]
    EmptyExport(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn empty_export(msg: impl Into<String>) -> Self {
        Self::EmptyExport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = DomainError::validation("Por favor, preencha o Código do Item.");
        assert_eq!(err.to_string(), "Por favor, preencha o Código do Item.");
    }

    #[test]
    fn out_of_range_reports_index_and_len() {
        let err = DomainError::index_out_of_range(5, 2);
        assert_eq!(err.to_string(), "index 5 is out of range (list has 2 items)");
    }
}
