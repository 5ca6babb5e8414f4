//! # Remote Backend
//!
//! [`RemoteBackend`] is the seam between the sync coordinator and the
//! network: the production [`RemoteClient`] speaks HTTP, while tests script
//! the trait to exercise partial-failure flows without a server.
//!
//! ## Offline Simulation
//! When no endpoint is configured, writes succeed after a fixed delay so the
//! application behaves identically with and without a backend. Reads cannot
//! be simulated (there is nothing to fetch) and fail with
//! [`SyncError::EndpointNotConfigured`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::protocol::{MutationAction, MutationRequest, MutationResponse, RemoteSnapshot};

/// Marker left in freshly scaffolded configs; an endpoint containing it is
/// treated as unset.
const PLACEHOLDER_MARKER: &str = "YOUR_SCRIPT_URL";

/// How long a simulated offline write takes. Long enough that the UI's
/// pending state is visible, short enough not to drag checkout.
const OFFLINE_WRITE_DELAY: Duration = Duration::from_millis(800);

// =============================================================================
// Backend Trait
// =============================================================================

/// The remote store as the coordinator sees it: a full-state fetch plus a
/// single mutation verb.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Fetches the complete remote state.
    async fn fetch_snapshot(&self) -> SyncResult<RemoteSnapshot>;

    /// Sends one mutation and returns the endpoint's answer.
    async fn send(&self, request: &MutationRequest) -> SyncResult<MutationResponse>;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// HTTP implementation of [`RemoteBackend`].
///
/// The endpoint is runtime-mutable (the user pastes it in during setup), so
/// it lives behind a lock rather than being fixed at construction.
#[derive(Debug)]
pub struct RemoteClient {
    endpoint: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl RemoteClient {
    /// Creates a client with no endpoint configured (offline mode).
    pub fn new() -> Self {
        RemoteClient {
            endpoint: RwLock::new(None),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client bound to an endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Self::new();
        client.set_endpoint(Some(endpoint.into()));
        client
    }

    /// Rebinds the endpoint at runtime. `None` returns to offline mode.
    pub fn set_endpoint(&self, endpoint: Option<String>) {
        let mut slot = self.endpoint.write().expect("endpoint lock poisoned");
        match &endpoint {
            Some(url) => info!(endpoint = %url, "remote endpoint configured"),
            None => info!("remote endpoint cleared, entering offline mode"),
        }
        *slot = endpoint;
    }

    /// The currently configured endpoint, if it is usable.
    pub fn endpoint(&self) -> Option<String> {
        let slot = self.endpoint.read().expect("endpoint lock poisoned");
        slot.as_ref()
            .filter(|url| !url.trim().is_empty() && !url.contains(PLACEHOLDER_MARKER))
            .cloned()
    }

    /// Whether a real endpoint is configured (placeholders do not count).
    pub fn is_configured(&self) -> bool {
        self.endpoint().is_some()
    }

    /// Asks the endpoint to provision its backing store.
    pub async fn setup(&self) -> SyncResult<MutationResponse> {
        self.send(&MutationRequest::bare(MutationAction::Setup)).await
    }

    /// Uploads a base64-encoded image; on success the response carries the
    /// hosted URL.
    pub async fn upload_image(
        &self,
        filename: &str,
        mime_type: &str,
        data_base64: &str,
    ) -> SyncResult<MutationResponse> {
        #[derive(Serialize)]
        struct Upload<'a> {
            filename: &'a str,
            mime_type: &'a str,
            data: &'a str,
        }
        let request = MutationRequest::new(
            MutationAction::UploadImage,
            &Upload {
                filename,
                mime_type,
                data: data_base64,
            },
        )?;
        self.send(&request).await?.into_result()
    }
}

impl Default for RemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteBackend for RemoteClient {
    async fn fetch_snapshot(&self) -> SyncResult<RemoteSnapshot> {
        let Some(endpoint) = self.endpoint() else {
            return Err(SyncError::EndpointNotConfigured);
        };

        debug!(endpoint = %endpoint, "fetching remote snapshot");
        let response = self.http.get(&endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let snapshot = response.json::<RemoteSnapshot>().await?;
        Ok(snapshot)
    }

    async fn send(&self, request: &MutationRequest) -> SyncResult<MutationResponse> {
        let Some(endpoint) = self.endpoint() else {
            // Offline simulation: the write "succeeds" after a fixed delay.
            warn!(action = ?request.action, "no endpoint configured, simulating remote write");
            tokio::time::sleep(OFFLINE_WRITE_DELAY).await;
            return Ok(MutationResponse::success());
        };

        debug!(endpoint = %endpoint, action = ?request.action, "posting mutation");
        let response = self.http.post(&endpoint).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let answer = response.json::<MutationResponse>().await?;
        Ok(answer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
