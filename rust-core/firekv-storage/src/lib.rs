// SPDX-License-Identifier: PMPL-1.0-or-later
//
// FireKV Storage Adapter
//
// This crate provides the ordered key-value interface that FireKV's
// collection engine is built on. The `StorageBackend` trait is the contract
// every store must satisfy; `ScanCursor` turns its paged prefix scans into a
// lazy, abandonable sequence.
//
// # Modules
//
// - [`backend`] -- The `StorageBackend` trait.
// - [`cursor`] -- `ScanCursor`, the incremental prefix scan.
// - [`error`] -- The `StorageError` enum covering all backend failure modes.
// - [`memory`] -- An in-memory `BTreeMap`-based backend.
// - [`metrics`] -- A transparent wrapper that collects operation statistics.
// - [`redb_backend`] -- A persistent single-file backend (feature `redb-backend`).
//
// # Example
//
// ```rust
// use std::sync::Arc;
// use firekv_storage::{InMemoryBackend, MetricsBackend, ScanCursor, StorageBackend};
//
// # tokio_test::block_on(async {
// let backend = Arc::new(MetricsBackend::new(InMemoryBackend::new()));
// backend.put(b"users:1", b"{}").await.unwrap();
//
// let mut cursor = ScanCursor::new(&backend, b"users:".to_vec(), 64);
// assert!(cursor.next().await.unwrap().is_some());
// assert_eq!(backend.stats().await.scan_count, 1);
// # });
// ```

pub mod backend;
pub mod cursor;
pub mod error;
pub mod memory;
pub mod metrics;

#[cfg(feature = "redb-backend")]
pub mod redb_backend;

pub use backend::{KvPair, StorageBackend};
pub use cursor::{ScanCursor, DEFAULT_PAGE_SIZE};
pub use error::StorageError;
pub use memory::InMemoryBackend;
pub use metrics::{BackendStats, MetricsBackend};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
