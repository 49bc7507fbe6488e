//! Error types for libris.
//!
//! All failures are strongly typed with thiserror and returned as values;
//! no store operation panics or aborts the process. Malformed persisted
//! lines are not errors at all — they surface as [`SkippedLine`]
//! diagnostics from the codec.
//!
//! [`SkippedLine`]: crate::codec::SkippedLine

use thiserror::Error;

/// Validation errors raised before a record is admitted into a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty after trimming whitespace.
    #[error("{kind} {field} cannot be empty")]
    EmptyField {
        /// Entity kind the field belongs to ("book", "user", "borrow record").
        kind: &'static str,
        /// Name of the offending field.
        field: &'static str,
    },

    /// A book's borrowed quantity exceeds its total quantity.
    #[error("borrowed quantity {borrowed} cannot exceed total quantity {total}")]
    BorrowedExceedsTotal {
        /// Candidate borrowed quantity.
        borrowed: u32,
        /// Candidate total quantity.
        total: u32,
    },

    /// A status code outside the known domain.
    #[error("invalid status code {code} (0 = checked out, 1 = returned)")]
    InvalidStatus {
        /// The rejected code.
        code: i64,
    },

    /// A search keyword that is empty after trimming. An empty keyword is a
    /// rejection, never "match all".
    #[error("search keyword cannot be empty")]
    EmptyKeyword,

    /// An update that names no field to change.
    #[error("update does not change any field")]
    EmptyUpdate,

    /// An update candidate whose key differs from the stored key. Keys are
    /// immutable for the lifetime of a record.
    #[error("{kind} key cannot be changed by an update")]
    KeyChanged {
        /// Entity kind of the record.
        kind: &'static str,
    },
}

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The candidate record failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Another record with the same key is already stored.
    #[error("{kind} with key [{key}] already exists")]
    DuplicateKey {
        /// Entity kind of the store.
        kind: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// No record with the given key exists.
    #[error("no {kind} found with key [{key}]")]
    NotFound {
        /// Entity kind of the store.
        kind: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// The store already holds its configured maximum number of records.
    #[error("{kind} store is full (capacity {capacity})")]
    CapacityExceeded {
        /// Entity kind of the store.
        kind: &'static str,
        /// The configured bound.
        capacity: usize,
    },

    /// Reading or rewriting the backing file failed. The in-memory store
    /// stays valid; only the save call itself is reported as failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_message_names_kind_and_field() {
        let err = ValidationError::EmptyField {
            kind: "book",
            field: "ISBN",
        };
        assert_eq!(err.to_string(), "book ISBN cannot be empty");
    }

    #[test]
    fn test_quantity_message_carries_both_values() {
        let err = ValidationError::BorrowedExceedsTotal {
            borrowed: 12,
            total: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_store_error_from_validation() {
        let err: StoreError = ValidationError::EmptyKeyword.into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            kind: "user",
            key: "U-042".to_string(),
        };
        assert_eq!(err.to_string(), "no user found with key [U-042]");
    }

    #[test]
    fn test_capacity_display() {
        let err = StoreError::CapacityExceeded {
            kind: "book",
            capacity: 100,
        };
        assert!(err.to_string().contains("capacity 100"));
    }

    #[test]
    fn test_io_error_wraps() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StoreError = io.into();
        assert!(err.to_string().contains("read-only"));
    }
}
