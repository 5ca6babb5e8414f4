//! # Local Mirror
//!
//! Durable on-device storage: one JSON document per key under a data
//! directory.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <data dir>/                                                            │
//! │    products.json    Vec<Product>                                        │
//! │    sales.json       Vec<SaleRecord>                                     │
//! │    expenses.json    Vec<Expense>                                        │
//! │    customers.json   Vec<Customer>                                       │
//! │    users.json       Vec<AppUser>                                        │
//! │    settings.json    AppSettings (merged structured form)                │
//! │    session.json     AppUser (the active identity)                       │
//! │    endpoint.json    String (remote endpoint URL)                        │
//! │    prefs.json       Prefs (theme + list/grid view)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every document is loaded and saved independently: a corrupt or missing
//! file yields that key's default and never blocks loading the others.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Keys
// =============================================================================

/// Document keys of the local mirror. One entry per entity kind, plus the
/// session identity, the remote endpoint, and the UI preference flags.
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const SALES: &str = "sales";
    pub const EXPENSES: &str = "expenses";
    pub const CUSTOMERS: &str = "customers";
    pub const USERS: &str = "users";
    pub const SETTINGS: &str = "settings";
    pub const SESSION: &str = "session";
    pub const ENDPOINT: &str = "endpoint";
    pub const PREFS: &str = "prefs";
}

// =============================================================================
// UI Preferences
// =============================================================================

/// Product list presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    List,
}

/// UI preference flags persisted alongside the entity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    pub dark_mode: bool,
    pub view_mode: ViewMode,
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs {
            dark_mode: false,
            view_mode: ViewMode::Grid,
        }
    }
}

// =============================================================================
// Local Store
// =============================================================================

/// Handle to the local mirror directory.
///
/// Writes are synchronous (`std::fs`): when a `write` returns, the document
/// is on disk. That is the durability guarantee the entity store builds on.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Opens (and creates if needed) a mirror at an explicit directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(LocalStore { dir })
    }

    /// Opens the mirror at the platform data directory.
    pub fn open_default() -> StoreResult<Self> {
        let dirs = ProjectDirs::from("com", "souk", "souk-pos").ok_or(StoreError::NoDataDir)?;
        Self::open(dirs.data_dir())
    }

    /// The mirror directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Reads one document, tolerating absence and corruption.
    ///
    /// Malformed JSON is logged and treated as absent so one bad document
    /// never aborts hydrating the rest of the mirror.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read local document");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed local document, starting empty");
                None
            }
        }
    }

    /// Reads one document, falling back to `T::default()`.
    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key).unwrap_or_default()
    }

    /// Writes one document. Synchronous: durable before returning.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        fs::write(self.path(key), raw)?;
        Ok(())
    }

    /// Removes one document. Absence is not an error.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();

        local.write(keys::PRODUCTS, &vec!["a", "b"]).unwrap();
        let back: Vec<String> = local.read(keys::PRODUCTS).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();

        assert!(local.read::<Vec<String>>(keys::SALES).is_none());
        let back: Vec<String> = local.read_or_default(keys::SALES);
        assert!(back.is_empty());
    }

    #[test]
    fn test_corrupt_document_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();

        std::fs::write(dir.path().join("products.json"), "{not json!").unwrap();
        assert!(local.read::<Vec<String>>(keys::PRODUCTS).is_none());

        // Other documents remain readable
        local.write(keys::USERS, &vec!["u1"]).unwrap();
        let users: Vec<String> = local.read(keys::USERS).unwrap();
        assert_eq!(users, vec!["u1"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();

        local.write(keys::SESSION, &"me").unwrap();
        local.remove(keys::SESSION).unwrap();
        local.remove(keys::SESSION).unwrap();
        assert!(local.read::<String>(keys::SESSION).is_none());
    }

    #[test]
    fn test_prefs_default() {
        let prefs = Prefs::default();
        assert!(!prefs.dark_mode);
        assert_eq!(prefs.view_mode, ViewMode::Grid);
    }
}
