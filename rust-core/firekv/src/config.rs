// SPDX-License-Identifier: PMPL-1.0-or-later
//! Store configuration.
//!
//! Defaults:
//! - locator: `redb` file `db.redb` in the working directory
//! - scan_batch_size: 128 entries per cursor page
//! - flush_on_close: true

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FireKvError;

/// Default database file opened when no locator is given.
pub const DEFAULT_DB_PATH: &str = "db.redb";

/// Where a store's data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Locator {
    /// Process-local, lost on close.
    Memory,
    /// A redb database file.
    Redb { path: PathBuf },
}

impl FromStr for Locator {
    type Err = FireKvError;

    /// `":memory:"` or `"memory:"` selects the in-memory store; `"redb:<path>"`
    /// or any other non-empty string is a redb file path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err(FireKvError::InvalidLocator("empty locator".to_string())),
            ":memory:" | "memory:" => Ok(Locator::Memory),
            _ => {
                let path = s.strip_prefix("redb:").unwrap_or(s);
                if path.is_empty() {
                    return Err(FireKvError::InvalidLocator(format!(
                        "missing path in {s:?}"
                    )));
                }
                Ok(Locator::Redb { path: PathBuf::from(path) })
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Memory => f.write_str(":memory:"),
            Locator::Redb { path } => write!(f, "redb:{}", path.display()),
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Locator::Redb {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// Configuration for a [`crate::Store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open.
    pub locator: Locator,
    /// Entries fetched per page by collection scans.
    pub scan_batch_size: usize,
    /// Whether `close()` flushes the backend before releasing it.
    pub flush_on_close: bool,
}

impl StoreConfig {
    /// Default configuration for the given locator.
    pub fn for_locator(locator: Locator) -> Self {
        Self {
            locator,
            ..Self::default()
        }
    }

    /// In-memory configuration, convenient for tests.
    pub fn in_memory() -> Self {
        Self::for_locator(Locator::Memory)
    }

    /// Reject settings no store can run with.
    pub fn validate(&self) -> Result<(), FireKvError> {
        if self.scan_batch_size == 0 {
            return Err(FireKvError::InvalidConfig(
                "scan_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            locator: Locator::default(),
            scan_batch_size: firekv_storage::DEFAULT_PAGE_SIZE,
            flush_on_close: true,
        }
    }
}
