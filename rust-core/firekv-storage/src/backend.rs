// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Core storage backend trait for FireKV.
//
// Defines the `StorageBackend` trait that every ordered key-value store must
// satisfy: point reads and writes, paged prefix scans, flush and close.
// Backends are thread-safe (`Send + Sync`) and fully asynchronous.

use async_trait::async_trait;

use crate::error::StorageError;

/// A single `(key, value)` entry returned by a scan.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// A pluggable ordered key-value storage backend.
///
/// Keys and values are opaque byte slices, ordered lexicographically by key.
/// Lazy enumeration is provided by [`crate::cursor::ScanCursor`], which pages
/// through [`StorageBackend::scan_prefix`].
///
/// Once [`StorageBackend::close`] has been called every operation must fail
/// with [`StorageError::Closed`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieve the value associated with `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist, rather than an error.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any previous value for `key`.
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete the value associated with `key`.
    ///
    /// Returns `Ok(true)` if the key existed and was removed, `Ok(false)` if
    /// the key was not present.
    async fn delete(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Check whether `key` exists in the store without retrieving its value.
    async fn exists(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Return one page of entries whose key starts with `prefix`.
    ///
    /// When `after` is given only keys strictly greater than it are returned,
    /// which lets callers resume a scan where the previous page ended. At most
    /// `limit` entries are returned, in ascending key order.
    async fn scan_prefix(
        &self,
        prefix: &[u8],
        after: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<KvPair>, StorageError>;

    /// Flush any buffered writes to durable storage.
    async fn flush(&self) -> Result<(), StorageError>;

    /// Release the underlying connection.
    ///
    /// Closing twice is not an error.
    async fn close(&self) -> Result<(), StorageError>;

    /// Whether [`StorageBackend::close`] has been called.
    fn is_closed(&self) -> bool;

    /// A human-readable name for this backend, used in logging and metrics.
    fn name(&self) -> &str;

    /// Return the approximate total size of stored data in bytes, if known.
    async fn approximate_size(&self) -> Result<Option<u64>, StorageError>;
}
