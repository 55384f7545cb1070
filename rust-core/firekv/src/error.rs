// SPDX-License-Identifier: PMPL-1.0-or-later
//! FireKV error types.

use firekv_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by collection and store operations.
///
/// A missing document is never an error; lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum FireKvError {
    /// The underlying store failed, or the connection is closed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// A stored value could not be decoded as the collection's document type.
    #[error("failed to decode document '{id}' in collection '{collection}': {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized for storage.
    #[error("failed to encode document for collection '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown query operator: {0:?}")]
    UnknownOperator(String),

    #[error("invalid store locator: {0}")]
    InvalidLocator(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FireKvError {
    /// True if the error reports a closed store.
    pub fn is_closed(&self) -> bool {
        matches!(self, FireKvError::Storage(e) if e.is_closed())
    }
}

/// Result alias for FireKV operations.
pub type Result<T> = std::result::Result<T, FireKvError>;
