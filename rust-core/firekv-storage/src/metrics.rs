// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Counting wrapper for FireKV storage backends.
//
// Wraps any `StorageBackend` and tallies the calls made through it, chiefly
// how many scan pages and entries a query or paginated read pulls from the
// store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{KvPair, StorageBackend};
use crate::error::StorageError;

/// Call counts observed by a [`MetricsBackend`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// `get` and `exists` calls.
    pub get_count: u64,
    pub put_count: u64,
    pub delete_count: u64,
    /// Scan pages requested.
    pub scan_count: u64,
    /// Entries returned across all scan pages.
    pub scanned_entries: u64,
}

/// A storage backend wrapper that counts the calls made through it.
///
/// Clones share one set of counters, so a handle kept by the caller keeps
/// reporting after the wrapper itself has been moved into a store.
///
/// # Example
///
/// ```rust
/// use firekv_storage::memory::InMemoryBackend;
/// use firekv_storage::metrics::MetricsBackend;
/// use firekv_storage::backend::StorageBackend;
///
/// # tokio_test::block_on(async {
/// let metered = MetricsBackend::new(InMemoryBackend::new());
///
/// metered.put(b"key", b"value").await.unwrap();
/// metered.get(b"key").await.unwrap();
///
/// let stats = metered.stats().await;
/// assert_eq!(stats.put_count, 1);
/// assert_eq!(stats.get_count, 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MetricsBackend<B: StorageBackend> {
    inner: B,
    stats: Arc<RwLock<BackendStats>>,
}

impl<B: StorageBackend> MetricsBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Arc::new(RwLock::new(BackendStats::default())),
        }
    }

    /// Snapshot of the counters so far.
    pub async fn stats(&self) -> BackendStats {
        self.stats.read().await.clone()
    }

    pub async fn reset_stats(&self) {
        *self.stats.write().await = BackendStats::default();
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    async fn record(&self, update: impl FnOnce(&mut BackendStats)) {
        update(&mut *self.stats.write().await);
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for MetricsBackend<B> {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.record(|s| s.get_count += 1).await;
        self.inner.get(key).await
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.record(|s| s.put_count += 1).await;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.record(|s| s.delete_count += 1).await;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.record(|s| s.get_count += 1).await;
        self.inner.exists(key).await
    }

    async fn scan_prefix(
        &self,
        prefix: &[u8],
        after: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<KvPair>, StorageError> {
        let page = self.inner.scan_prefix(prefix, after, limit).await?;
        let entries = page.len() as u64;
        self.record(|s| {
            s.scan_count += 1;
            s.scanned_entries += entries;
        })
        .await;
        Ok(page)
    }

    async fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.inner.close().await
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
        self.inner.approximate_size().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ScanCursor;
    use crate::memory::InMemoryBackend;

    #[tokio::test]
    async fn test_counts_operations() {
        let metered = MetricsBackend::new(InMemoryBackend::new());

        metered.put(b"a", b"111").await.unwrap();
        metered.put(b"b", b"22").await.unwrap();
        metered.get(b"a").await.unwrap();
        metered.get(b"missing").await.unwrap();
        metered.exists(b"b").await.unwrap();
        metered.delete(b"a").await.unwrap();

        assert_eq!(
            metered.stats().await,
            BackendStats {
                get_count: 3,
                put_count: 2,
                delete_count: 1,
                ..BackendStats::default()
            }
        );
    }

    #[tokio::test]
    async fn test_counts_scan_pages() {
        let metered = Arc::new(MetricsBackend::new(InMemoryBackend::new()));
        for i in 0..5u8 {
            metered.put(&[b'k', i], b"v").await.unwrap();
        }

        let mut cursor = ScanCursor::new(&metered, b"k".to_vec(), 2);
        while cursor.next().await.unwrap().is_some() {}

        let stats = metered.stats().await;
        assert_eq!(stats.scan_count, 3);
        assert_eq!(stats.scanned_entries, 5);
    }

    #[tokio::test]
    async fn test_clone_shares_stats_and_reset() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        let observer = metered.clone();

        metered.put(b"k", b"v").await.unwrap();
        assert_eq!(observer.stats().await.put_count, 1);

        observer.reset_stats().await;
        assert_eq!(metered.stats().await.put_count, 0);
    }

    #[tokio::test]
    async fn test_delegates_close_and_name() {
        let metered = MetricsBackend::new(InMemoryBackend::new());
        assert_eq!(metered.name(), "in-memory");
        metered.close().await.unwrap();
        assert!(metered.is_closed());
        assert!(metered.inner().is_closed());
    }
}
