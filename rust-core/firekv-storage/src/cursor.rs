// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Lazy prefix scans over a storage backend.
//
// A `ScanCursor` pages through `StorageBackend::scan_prefix`, resuming each
// page strictly after the last key it handed out. Nothing is held open in the
// backend between pages, so a cursor can be dropped at any point. Entries
// are read at consumption time: writes that land ahead of the cursor are
// observed, writes behind it are not.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::backend::{KvPair, StorageBackend};
use crate::error::StorageError;

/// Default number of entries fetched per page.
pub const DEFAULT_PAGE_SIZE: usize = 128;

/// An incremental, ascending scan over every key sharing a prefix.
///
/// The cursor holds a non-owning reference to its backend; once the backend
/// is closed or dropped, [`ScanCursor::next`] fails with [`StorageError::Closed`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use firekv_storage::backend::StorageBackend;
/// use firekv_storage::cursor::ScanCursor;
/// use firekv_storage::memory::InMemoryBackend;
///
/// # tokio_test::block_on(async {
/// let backend = Arc::new(InMemoryBackend::new());
/// backend.put(b"a:1", b"one").await.unwrap();
/// backend.put(b"a:2", b"two").await.unwrap();
/// backend.put(b"b:1", b"other").await.unwrap();
///
/// let mut cursor = ScanCursor::new(&backend, b"a:".to_vec(), 1);
/// let (key, _) = cursor.next().await.unwrap().unwrap();
/// assert_eq!(key, b"a:1".to_vec());
/// let (key, _) = cursor.next().await.unwrap().unwrap();
/// assert_eq!(key, b"a:2".to_vec());
/// assert!(cursor.next().await.unwrap().is_none());
/// # });
/// ```
pub struct ScanCursor<B: StorageBackend + ?Sized> {
    backend: Weak<B>,
    prefix: Vec<u8>,
    page_size: usize,
    /// Last key handed out (or buffered), used as the resume point.
    last_key: Option<Vec<u8>>,
    buffer: VecDeque<KvPair>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<B: StorageBackend + ?Sized> ScanCursor<B> {
    /// Create a cursor over every key starting with `prefix`.
    ///
    /// A `page_size` of zero is treated as one.
    pub fn new(backend: &Arc<B>, prefix: Vec<u8>, page_size: usize) -> Self {
        Self {
            backend: Arc::downgrade(backend),
            prefix,
            page_size: page_size.max(1),
            last_key: None,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// The prefix this cursor is bounded to.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Number of pages requested from the backend so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Return the next entry, or `None` once the prefix range is exhausted.
    ///
    /// Fails with [`StorageError::Closed`] once the backend is closed or
    /// dropped, even if entries are still buffered.
    pub async fn next(&mut self) -> Result<Option<KvPair>, StorageError> {
        let backend = self.live_backend()?;
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page(backend.as_ref()).await?;
        }
        Ok(self.buffer.pop_front())
    }

    /// Advance past up to `n` entries without returning them.
    ///
    /// Returns how many entries were actually skipped, which is less than `n`
    /// only when the range ran out.
    pub async fn skip(&mut self, n: usize) -> Result<usize, StorageError> {
        let mut skipped = 0;
        while skipped < n {
            if self.next().await?.is_none() {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }

    fn live_backend(&self) -> Result<Arc<B>, StorageError> {
        match self.backend.upgrade() {
            Some(backend) if !backend.is_closed() => Ok(backend),
            _ => Err(StorageError::Closed),
        }
    }

    async fn fetch_page(&mut self, backend: &B) -> Result<(), StorageError> {
        let page = backend
            .scan_prefix(&self.prefix, self.last_key.as_deref(), self.page_size)
            .await?;
        self.pages_fetched += 1;

        trace!(
            backend = backend.name(),
            page = self.pages_fetched,
            entries = page.len(),
            "fetched scan page"
        );

        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some((key, _)) = page.last() {
            self.last_key = Some(key.clone());
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl<B: StorageBackend + ?Sized> std::fmt::Debug for ScanCursor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCursor")
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
