// SPDX-License-Identifier: PMPL-1.0-or-later
//
// redb-backed persistent storage backend for FireKV.
//
// Uses redb (pure Rust, B-tree, ACID, single-file database) to provide
// durable ordered key-value storage.
//
// # Design
//
// - Single redb `Database` file containing one table of byte keys/values.
// - Every call runs its own short transaction on the blocking pool, so a
//   paused scan never pins a read transaction.
// - `scan_prefix` uses redb's `range()` starting at the prefix (or just
//   after the resume key) and stops at the first key outside the prefix.
// - `close()` drops the `Database` handle; later calls fail with `Closed`.

use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, TableDefinition, TableError};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{KvPair, StorageBackend};
use crate::error::StorageError;

/// Table holding every FireKV entry.
const DOCUMENTS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("documents");

/// A persistent storage backend powered by redb.
///
/// # Example
///
/// ```rust,no_run
/// use firekv_storage::redb_backend::RedbBackend;
/// use firekv_storage::backend::StorageBackend;
///
/// # tokio_test::block_on(async {
/// let store = RedbBackend::open("/tmp/firekv-test.redb").unwrap();
/// store.put(b"hello", b"world").await.unwrap();
/// let val = store.get(b"hello").await.unwrap();
/// assert_eq!(val, Some(b"world".to_vec()));
/// store.close().await.unwrap();
/// # });
/// ```
pub struct RedbBackend {
    /// The redb database handle; `None` once closed.
    db: RwLock<Option<Arc<Database>>>,
    /// Path to the database file (for diagnostics and approximate_size).
    path: PathBuf,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// Creates the file and parent directories if they don't exist. The
    /// table is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&path).map_err(|e| {
            StorageError::BackendUnavailable(format!(
                "failed to open redb at {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "opened redb backend");

        Ok(Self {
            db: RwLock::new(Some(Arc::new(db))),
            path,
        })
    }

    /// Return the filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn handle(&self) -> Result<Arc<Database>, StorageError> {
        self.db.read().await.clone().ok_or(StorageError::Closed)
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish()
    }
}

fn join_error(e: tokio::task::JoinError) -> StorageError {
    StorageError::BackendUnavailable(format!("task join: {e}"))
}

/// A table that exists with the wrong key or value type holds data this
/// backend did not write.
fn table_error(e: TableError) -> StorageError {
    match e {
        TableError::TableTypeMismatch { .. } | TableError::TableIsMultimap(_) => {
            StorageError::CorruptedData(format!("open table: {e}"))
        }
        other => StorageError::BackendUnavailable(format!("open table: {other}")),
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let db = self.handle().await?;
        let key = key.to_vec();

        tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, StorageError> {
            let txn = db
                .begin_read()
                .map_err(|e| StorageError::BackendUnavailable(format!("read txn: {e}")))?;

            let table = match txn.open_table(DOCUMENTS_TABLE) {
                Ok(t) => t,
                // Table does not exist until the first write
                Err(TableError::TableDoesNotExist(_)) => return Ok(None),
                Err(e) => return Err(table_error(e)),
            };

            match table.get(key.as_slice()) {
                Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                Ok(None) => Ok(None),
                Err(e) => Err(StorageError::CorruptedData(format!("get: {e}"))),
            }
        })
        .await
        .map_err(join_error)?
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let db = self.handle().await?;
        let key = key.to_vec();
        let value = value.to_vec();

        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let txn = db
                .begin_write()
                .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
            {
                let mut table = txn
                    .open_table(DOCUMENTS_TABLE)
                    .map_err(table_error)?;
                table
                    .insert(key.as_slice(), value.as_slice())
                    .map_err(|e| StorageError::CorruptedData(format!("insert: {e}")))?;
            }
            txn.commit()
                .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        let db = self.handle().await?;
        let key = key.to_vec();

        tokio::task::spawn_blocking(move || -> Result<bool, StorageError> {
            let txn = db
                .begin_write()
                .map_err(|e| StorageError::BackendUnavailable(format!("write txn: {e}")))?;
            let existed;
            {
                let mut table = txn
                    .open_table(DOCUMENTS_TABLE)
                    .map_err(table_error)?;
                existed = table
                    .remove(key.as_slice())
                    .map_err(|e| StorageError::CorruptedData(format!("remove: {e}")))?
                    .is_some();
            }
            txn.commit()
                .map_err(|e| StorageError::CorruptedData(format!("commit: {e}")))?;
            Ok(existed)
        })
        .await
        .map_err(join_error)?
    }

    async fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn scan_prefix(
        &self,
        prefix: &[u8],
        after: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<KvPair>, StorageError> {
        let db = self.handle().await?;
        let prefix = prefix.to_vec();
        let after = after.map(<[u8]>::to_vec);

        tokio::task::spawn_blocking(move || -> Result<Vec<KvPair>, StorageError> {
            let txn = db
                .begin_read()
                .map_err(|e| StorageError::BackendUnavailable(format!("read txn: {e}")))?;
            let table = match txn.open_table(DOCUMENTS_TABLE) {
                Ok(t) => t,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => return Err(table_error(e)),
            };

            let lower: Bound<&[u8]> = match after.as_deref() {
                Some(key) if key >= prefix.as_slice() => Bound::Excluded(key),
                _ => Bound::Included(prefix.as_slice()),
            };
            let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (lower, Bound::Unbounded);
            let iter = table
                .range::<&[u8]>(bounds)
                .map_err(|e| StorageError::CorruptedData(format!("range scan: {e}")))?;

            let mut results = Vec::new();
            for entry in iter {
                if results.len() >= limit {
                    break;
                }
                let entry =
                    entry.map_err(|e| StorageError::CorruptedData(format!("scan entry: {e}")))?;
                let k = entry.0.value().to_vec();
                if !k.starts_with(&prefix) {
                    break;
                }
                results.push((k, entry.1.value().to_vec()));
            }

            Ok(results)
        })
        .await
        .map_err(join_error)?
    }

    async fn flush(&self) -> Result<(), StorageError> {
        // Every write transaction is durable on commit; only the closed check
        // applies here.
        self.handle().await.map(|_| ())
    }

    async fn close(&self) -> Result<(), StorageError> {
        let previous = self.db.write().await.take();
        if previous.is_some() {
            debug!(path = %self.path.display(), "closed redb backend");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        match self.db.try_read() {
            Ok(guard) => guard.is_none(),
            // A writer holds the lock only while closing.
            Err(_) => true,
        }
    }

    fn name(&self) -> &str {
        "redb"
    }

    async fn approximate_size(&self) -> Result<Option<u64>, StorageError> {
        self.handle().await?;
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(_) => Ok(None),
        }
    }
}
