//! # Storage Error Types
//!
//! Error types for key-value storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds the key and the operation           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartError::StorageRead / StorageWrite (market-cart) ← logged,         │
//! │  in-memory cart stays authoritative                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Key-value storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be opened.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Reading a key failed.
    #[error("Failed to read '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    /// Writing a key failed.
    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn read(key: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::ReadFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::WriteFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors that are not tied to a key.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut / PoolClosed → StorageError::ConnectionFailed
/// Other                                  → StorageError::Internal
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                StorageError::ConnectionFailed("Connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => StorageError::ConnectionFailed("Pool is closed".to_string()),
            _ => StorageError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_key() {
        let err = StorageError::write("@cart", "disk full");
        assert_eq!(err.to_string(), "Failed to write '@cart': disk full");

        let err = StorageError::read("@cart", "locked");
        assert_eq!(err.to_string(), "Failed to read '@cart': locked");
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: StorageError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, StorageError::ConnectionFailed(_)));
    }
}
