// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Storage error types for the FireKV adapter layer.
//
// Every failure raised by a backend (I/O, corrupted bytes, an unreachable or
// closed connection) is reported through `StorageError`. Absent keys are not
// errors: lookups return `Ok(None)` and deletes return `Ok(false)`.

use thiserror::Error;

/// Errors that can occur when interacting with a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred in the underlying storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data is corrupted or in an unexpected format.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// The storage backend is not available (e.g., failed to open, task lost).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The connection has been closed; no further operations are accepted.
    #[error("storage connection is closed")]
    Closed,
}

impl StorageError {
    /// True if this error reports a closed connection.
    pub fn is_closed(&self) -> bool {
        matches!(self, StorageError::Closed)
    }
}
