//! Error types for remote synchronization.

use thiserror::Error;

/// Failures while talking to the remote endpoint.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No remote endpoint has been configured yet.
    #[error("no remote endpoint configured")]
    EndpointNotConfigured,

    /// Network-level failure (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("remote returned HTTP {0}")]
    Status(u16),

    /// The remote payload was not the JSON shape we expected.
    #[error("malformed remote payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote accepted the request but reported a failure.
    #[error("remote rejected request: {0}")]
    Rejected(String),

    /// Applying fetched state to the local store failed.
    #[error("local store error: {0}")]
    Store(#[from] souk_store::StoreError),
}

/// Convenience type alias for Results with SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
