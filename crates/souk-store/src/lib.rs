//! # souk-store: Entity Store + Durable Local Mirror
//!
//! Owns the in-memory entity collections and their durable on-device mirror.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   souk-engine / souk-sync                                               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌─────────────┐  with / with_mut   ┌──────────────┐                   │
//! │   │ SharedStore │ ─────────────────► │ EntityStore  │                   │
//! │   │ (Arc+Mutex) │                    │ 6 collections│                   │
//! │   └─────────────┘                    └──────┬───────┘                   │
//! │                                             │ persists before return   │
//! │                                      ┌──────▼───────┐                   │
//! │                                      │  LocalStore  │                   │
//! │                                      │ (JSON files) │                   │
//! │                                      └──────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod local;
pub mod settings;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use local::{keys, LocalStore, Prefs, ViewMode};
pub use settings::{flatten, merge_entries, SettingEntry};
pub use store::{EntityStore, SharedStore};
