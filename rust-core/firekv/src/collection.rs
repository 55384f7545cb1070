// SPDX-License-Identifier: PMPL-1.0-or-later
//! Named document collections.
//!
//! A [`Collection`] is a lightweight view over one key range of the store:
//! every document of collection `N` lives at `KeyCodec::encode(N, id)`, so
//! enumeration is a prefix scan over `KeyCodec::prefix(N)`. Queries and
//! pagination consume that scan lazily through a [`DocumentCursor`]; there
//! are no indexes, so their cost is linear in the collection size.
//!
//! Values are stored as JSON. A stored value that does not decode as the
//! collection's document type aborts the operation that reads it with
//! [`FireKvError::Decode`].

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use firekv_storage::{ScanCursor, StorageBackend, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{FireKvError, Result};
use crate::key::KeyCodec;
use crate::query::{matches, Operator};

/// A schemaless document: field names mapped to JSON values.
pub type Document = serde_json::Map<String, Value>;

/// A view over the documents stored under one collection name.
///
/// Views are cheap to clone, and two views with the same name on the same
/// store are interchangeable. A view does not keep the store alive: once the
/// store is closed or dropped, every operation fails with
/// [`StorageError::Closed`].
pub struct Collection<T = Document> {
    name: Arc<str>,
    backend: Weak<dyn StorageBackend>,
    scan_batch_size: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            backend: Weak::clone(&self.backend),
            scan_batch_size: self.scan_batch_size,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("scan_batch_size", &self.scan_batch_size)
            .finish()
    }
}

impl<T> Collection<T> {
    pub(crate) fn new(
        name: &str,
        backend: Weak<dyn StorageBackend>,
        scan_batch_size: usize,
    ) -> Self {
        Self {
            name: Arc::from(name),
            backend,
            scan_batch_size,
            _marker: PhantomData,
        }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> Result<Arc<dyn StorageBackend>> {
        match self.backend.upgrade() {
            Some(backend) if !backend.is_closed() => Ok(backend),
            _ => Err(StorageError::Closed.into()),
        }
    }

    fn key(&self, id: &str) -> Vec<u8> {
        KeyCodec::encode(&self.name, id)
    }

    fn open_cursor(&self, page_size: usize) -> Result<DocumentCursor<T>> {
        let backend = self.backend()?;
        Ok(DocumentCursor {
            collection: Arc::clone(&self.name),
            inner: ScanCursor::new(&backend, KeyCodec::prefix(&self.name), page_size),
            _marker: PhantomData,
        })
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, document: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(document).map_err(|source| FireKvError::Encode {
            collection: self.name.to_string(),
            source,
        })
    }

    /// Store `document` under a freshly generated id and return the id.
    #[instrument(skip(self, document), fields(collection = %self.name))]
    pub async fn add(&self, document: &T) -> Result<String> {
        let bytes = self.encode(document)?;
        let id = Uuid::new_v4().to_string();
        self.backend()?.put(&self.key(&id), &bytes).await?;
        debug!(id = %id, bytes = bytes.len(), "added document");
        Ok(id)
    }

    /// Create or overwrite the document with the given id.
    #[instrument(skip(self, document), fields(collection = %self.name))]
    pub async fn set(&self, id: &str, document: &T) -> Result<()> {
        let bytes = self.encode(document)?;
        self.backend()?.put(&self.key(id), &bytes).await?;
        debug!(bytes = bytes.len(), "stored document");
        Ok(())
    }

    /// Fetch a document by id. A missing id is `Ok(None)`.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        match self.backend()?.get(&self.key(id)).await? {
            Some(bytes) => decode_document(&self.name, id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Remove a document. Deleting a missing id succeeds.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let existed = self.backend()?.delete(&self.key(id)).await?;
        debug!(existed, "deleted document");
        Ok(())
    }

    /// Whether a document with this id exists.
    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.backend()?.exists(&self.key(id)).await?)
    }

    /// Lazily iterate over `(id, document)` pairs in ascending id order.
    pub fn cursor(&self) -> Result<DocumentCursor<T>> {
        self.open_cursor(self.scan_batch_size)
    }

    /// Every document whose `field` satisfies `operator` against `value`,
    /// in ascending id order.
    #[instrument(skip(self, value), fields(collection = %self.name))]
    pub async fn query(
        &self,
        field: &str,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Result<Vec<T>> {
        let entries = self.query_entries(field, operator, value).await?;
        Ok(entries.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Like [`Collection::query`], keeping each document's id.
    #[instrument(skip(self, value), fields(collection = %self.name))]
    pub async fn query_entries(
        &self,
        field: &str,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Result<Vec<(String, T)>> {
        let value = value.into();
        let mut cursor = self.cursor()?;
        let mut results = Vec::new();
        let mut scanned = 0usize;

        // Every entry must decode as `T`, whether or not it matches.
        while let Some((id, bytes)) = cursor.next_raw().await? {
            scanned += 1;
            let document: T = decode_document(&self.name, &id, &bytes)?;
            let fields: Value = decode_document(&self.name, &id, &bytes)?;
            if matches(&fields, field, operator, &value) {
                results.push((id, document));
            }
        }

        debug!(scanned, matched = results.len(), "query complete");
        Ok(results)
    }

    /// Every document in the collection, in ascending id order.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn get_all(&self) -> Result<Vec<T>> {
        let entries = self.entries().await?;
        Ok(entries.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Every `(id, document)` pair in the collection, in ascending id order.
    pub async fn entries(&self) -> Result<Vec<(String, T)>> {
        let mut cursor = self.cursor()?;
        let mut results = Vec::new();
        while let Some(entry) = cursor.next().await? {
            results.push(entry);
        }
        Ok(results)
    }

    /// Up to `limit` documents after skipping the first `offset`, in
    /// ascending id order.
    ///
    /// Skipped entries are read but their values are not decoded.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn paginate(&self, limit: usize, offset: usize) -> Result<Vec<T>> {
        let page_size = self
            .scan_batch_size
            .min(offset.saturating_add(limit))
            .max(1);
        let mut cursor = self.open_cursor(page_size)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        if cursor.skip(offset).await? < offset {
            return Ok(Vec::new());
        }

        let mut page = Vec::with_capacity(limit.min(self.scan_batch_size));
        while page.len() < limit {
            match cursor.next().await? {
                Some((_, document)) => page.push(document),
                None => break,
            }
        }
        Ok(page)
    }

    /// Number of documents in the collection.
    pub async fn count(&self) -> Result<usize> {
        let mut cursor = self.cursor()?;
        let mut count = 0;
        while cursor.next_raw().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}

/// A lazy, ascending scan over one collection's documents.
///
/// Pages are fetched from the store on demand and nothing is held open
/// between them, so the cursor can be dropped at any point. Writes made while
/// the cursor is live may or may not be observed.
pub struct DocumentCursor<T> {
    collection: Arc<str>,
    inner: ScanCursor<dyn StorageBackend>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentCursor<T> {
    /// Next `(id, raw JSON bytes)` entry, checking the key belongs here.
    async fn next_raw(&mut self) -> Result<Option<(String, Vec<u8>)>> {
        let Some((key, value)) = self.inner.next().await? else {
            return Ok(None);
        };

        let (collection, id) = KeyCodec::decode(&key).map_err(|e| {
            StorageError::CorruptedData(format!(
                "undecodable key in collection '{}': {e}",
                self.collection
            ))
        })?;
        if collection != *self.collection {
            return Err(StorageError::CorruptedData(format!(
                "key for collection '{collection}' found under '{}'",
                self.collection
            ))
            .into());
        }
        Ok(Some((id, value)))
    }

    /// Advance past up to `n` documents without decoding them.
    ///
    /// Returns how many were skipped; fewer than `n` means the collection
    /// ran out.
    pub async fn skip(&mut self, n: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < n && self.next_raw().await?.is_some() {
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Name of the collection being scanned.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl<T: DeserializeOwned> DocumentCursor<T> {
    /// Next `(id, document)` pair, or `None` at the end of the collection.
    pub async fn next(&mut self) -> Result<Option<(String, T)>> {
        match self.next_raw().await? {
            Some((id, bytes)) => {
                let document = decode_document(&self.collection, &id, &bytes)?;
                Ok(Some((id, document)))
            }
            None => Ok(None),
        }
    }
}

impl<T> std::fmt::Debug for DocumentCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("collection", &self.collection)
            .field("inner", &self.inner)
            .finish()
    }
}

fn decode_document<D: DeserializeOwned>(collection: &str, id: &str, bytes: &[u8]) -> Result<D> {
    serde_json::from_slice(bytes).map_err(|source| FireKvError::Decode {
        collection: collection.to_string(),
        id: id.to_string(),
        source,
    })
}
