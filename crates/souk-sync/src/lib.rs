//! # souk-sync: Remote Client + Sync Coordinator
//!
//! The only crate that touches the network. It owns the remote wire
//! protocol, the HTTP client with its offline simulation, and the
//! coordinator that keeps the entity store and the remote endpoint aligned.
//!
//! ## Sync Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Reads:   refresh_all ── GET snapshot ──► wholesale replace per key    │
//! │                                                                         │
//! │   Writes:  local apply (durable) ──► POST mutation ──► bool outcome     │
//! │                                                                         │
//! │   Offline: writes simulate success after a delay; reads fail fast       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod remote;

pub use coordinator::{RefreshSummary, SyncCoordinator};
pub use error::{SyncError, SyncResult};
pub use protocol::{MutationAction, MutationRequest, MutationResponse, RemoteSnapshot};
pub use remote::{RemoteBackend, RemoteClient};
