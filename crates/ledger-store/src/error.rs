use thiserror::Error;

use crate::Version;

/// Errors that can occur when interacting with the ledger store.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// A compare-and-swap update found a different version than expected.
    ///
    /// Another writer committed first; the caller should reload and retry.
    #[error(
        "Concurrency conflict on {collection} {key}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        collection: &'static str,
        key: String,
        expected: Version,
        actual: Version,
    },

    /// An insert collided with an existing unique key.
    #[error("Unique constraint violated on {collection}: {key} already exists")]
    UniqueViolation {
        collection: &'static str,
        key: String,
    },

    /// A record references a parent that does not exist.
    #[error("{collection} references missing {target} {key}")]
    MissingReference {
        collection: &'static str,
        target: &'static str,
        key: String,
    },

    /// An update targeted an insert-only record.
    #[error("{collection} records are immutable once written")]
    ImmutableRecord { collection: &'static str },

    /// The unit of work was malformed.
    #[error("Invalid unit of work: {0}")]
    InvalidUnitOfWork(String),

    /// A stored value could not be decoded.
    #[error("Corrupt record in {collection}: {reason}")]
    CorruptRecord {
        collection: &'static str,
        reason: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl LedgerStoreError {
    /// Returns true if retrying the whole read-modify-write may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerStoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for ledger store operations.
pub type Result<T> = std::result::Result<T, LedgerStoreError>;
