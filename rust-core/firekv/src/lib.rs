// SPDX-License-Identifier: PMPL-1.0-or-later
//! FireKV
//!
//! Document collections on top of an ordered key-value store. Documents are
//! keyed by `(collection, id)` with an order-preserving encoding, so every
//! collection is one contiguous key range; enumeration, queries and
//! pagination are lazy prefix scans filtered in memory.
//!
//! - [`key`]: the `(collection, id)` key codec
//! - [`query`]: field predicates and the [`Operator`] enum
//! - [`collection`]: [`Collection`] and [`DocumentCursor`]
//! - [`store`]: the [`Store`] facade owning the backend connection
//! - [`config`]: [`StoreConfig`] and [`Locator`]
//!
//! ```rust
//! use firekv::{open_store, Operator};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct User { name: String, age: u32 }
//!
//! # tokio_test::block_on(async {
//! let store = open_store(":memory:").await.unwrap();
//! let users = store.collection::<User>("users");
//!
//! for (name, age) in [("John", 30), ("Jane", 25), ("Bob", 40)] {
//!     users.add(&User { name: name.into(), age }).await.unwrap();
//! }
//!
//! let older = users.query("age", Operator::Gt, 25).await.unwrap();
//! assert_eq!(older.len(), 2);
//! assert_eq!(users.paginate(2, 0).await.unwrap().len(), 2);
//!
//! store.close().await.unwrap();
//! # });
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod key;
pub mod query;
pub mod store;

pub use collection::{Collection, Document, DocumentCursor};
pub use config::{Locator, StoreConfig};
pub use error::{FireKvError, Result};
pub use key::{KeyCodec, KeyError};
pub use query::{matches, Field, Operator};
pub use store::{open_store, Store};

pub use firekv_storage::{
    BackendStats, InMemoryBackend, MetricsBackend, StorageBackend, StorageError,
};

#[cfg(feature = "redb-backend")]
pub use firekv_storage::RedbBackend;
