// SPDX-License-Identifier: PMPL-1.0-or-later
//! The store facade: owns the backend connection and hands out collections.

use std::sync::Arc;

use firekv_storage::{InMemoryBackend, StorageBackend};
use tracing::{info, warn};

use crate::collection::{Collection, Document};
use crate::config::{Locator, StoreConfig};
use crate::error::Result;

/// Open a store from a locator string such as `":memory:"` or
/// `"data/app.redb"`.
pub async fn open_store(locator: &str) -> Result<Store> {
    Store::open(locator).await
}

/// An open FireKV store.
///
/// The store is the sole owner of its backend. Collections obtained from it
/// hold only weak references, so after [`Store::close`] (or after the store
/// is dropped) their operations fail with a closed-storage error.
///
/// # Example
///
/// ```rust
/// use firekv::{Document, Operator, Store};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let store = Store::open(":memory:").await.unwrap();
/// let users = store.collection::<Document>("users");
///
/// let doc = json!({ "name": "John", "age": 30 }).as_object().unwrap().clone();
/// let id = users.add(&doc).await.unwrap();
/// assert_eq!(users.get(&id).await.unwrap(), Some(doc));
///
/// let adults = users.query("age", Operator::Gte, 18).await.unwrap();
/// assert_eq!(adults.len(), 1);
///
/// store.close().await.unwrap();
/// assert!(users.get(&id).await.unwrap_err().is_closed());
/// # });
/// ```
pub struct Store {
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
}

impl Store {
    /// Parse `locator` and open the store with default settings.
    pub async fn open(locator: &str) -> Result<Self> {
        let locator: Locator = locator.parse()?;
        Self::open_with_config(StoreConfig::for_locator(locator)).await
    }

    /// Open the backend described by `config`.
    pub async fn open_with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let backend = open_backend(&config.locator).await?;
        info!(
            locator = %config.locator,
            backend = backend.name(),
            "opened store"
        );
        Ok(Self { backend, config })
    }

    /// Wrap an already-open backend with default settings.
    pub fn with_backend<B: StorageBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            config: StoreConfig::default(),
        }
    }

    /// Wrap an already-open backend. `config.locator` is informational only.
    pub fn with_backend_and_config<B: StorageBackend + 'static>(
        backend: B,
        config: StoreConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend: Arc::new(backend),
            config,
        })
    }

    /// A view over the collection called `name`.
    ///
    /// Calling this twice with the same name yields two views of the same
    /// documents.
    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        Collection::new(name, Arc::downgrade(&self.backend), self.config.scan_batch_size)
    }

    /// A schemaless view over the collection called `name`.
    pub fn documents(&self, name: &str) -> Collection<Document> {
        self.collection(name)
    }

    /// The settings this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Name of the underlying backend, e.g. `"redb"`.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the backend connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.backend.is_closed()
    }

    /// Flush (if configured) and release the backend connection.
    ///
    /// The connection is released even when the flush fails; the flush error
    /// is then returned.
    pub async fn close(self) -> Result<()> {
        let flushed = if self.config.flush_on_close && !self.backend.is_closed() {
            self.backend.flush().await
        } else {
            Ok(())
        };
        if let Err(ref e) = flushed {
            warn!(error = %e, "flush before close failed");
        }

        self.backend.close().await?;
        info!(backend = self.backend.name(), "closed store");
        flushed?;
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

async fn open_backend(locator: &Locator) -> Result<Arc<dyn StorageBackend>> {
    match locator {
        Locator::Memory => Ok(Arc::new(InMemoryBackend::new())),
        #[cfg(feature = "redb-backend")]
        Locator::Redb { path } => {
            let path = path.clone();
            let backend =
                tokio::task::spawn_blocking(move || firekv_storage::RedbBackend::open(path))
                    .await
                    .map_err(|e| {
                        firekv_storage::StorageError::BackendUnavailable(format!(
                            "task join: {e}"
                        ))
                    })??;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "redb-backend"))]
        Locator::Redb { path } => Err(crate::error::FireKvError::InvalidLocator(format!(
            "{} needs the redb-backend feature",
            path.display()
        ))),
    }
}
