//! # Session
//!
//! Identity and endpoint binding. Login is by email against the local user
//! registry; the very first login on a fresh install bootstraps an admin so
//! the register is usable before any backend exists.
//!
//! A user may carry their own endpoint binding. Logging in as such a user
//! rebinds the application: the cached entity collections are cleared and
//! refetched from the new endpoint, while the user registry and settings
//! stay put.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use souk_core::{AppUser, UserRole};
use souk_store::StoreError;
use souk_sync::{RemoteClient, SyncCoordinator};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("email is required")]
    EmailRequired,

    #[error("no user registered with email {0}")]
    UnknownEmail(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Session Manager
// =============================================================================

/// Owns login/logout and endpoint (re)binding.
///
/// Holds the concrete [`RemoteClient`] alongside the coordinator because
/// endpoint rebinding is a client-level operation the backend trait does not
/// expose.
#[derive(Clone)]
pub struct SessionManager {
    coordinator: SyncCoordinator,
    client: Arc<RemoteClient>,
}

impl SessionManager {
    /// Wires the session layer up, rehydrating the client from the endpoint
    /// persisted by a previous run so a restart comes back online instead
    /// of silently falling into offline simulation.
    pub fn new(coordinator: SyncCoordinator, client: Arc<RemoteClient>) -> Self {
        if let Some(endpoint) = coordinator.store().with(|s| s.endpoint()) {
            info!(endpoint = %endpoint, "restored persisted remote endpoint");
            client.set_endpoint(Some(endpoint));
        }
        SessionManager {
            coordinator,
            client,
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// The user whose session survived the last shutdown, if any.
    pub fn current_user(&self) -> Option<AppUser> {
        self.coordinator.store().with(|s| s.session())
    }

    /// Logs in by email.
    ///
    /// On a fresh install (empty registry) the email bootstraps an admin
    /// bound to the currently configured endpoint. Otherwise the email must
    /// match a registered user (case-insensitive).
    pub async fn login(&self, email: &str) -> Result<AppUser, SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::EmailRequired);
        }

        let registry_empty = self.coordinator.store().with(|s| s.users.is_empty());
        if registry_empty {
            return self.bootstrap_admin(email);
        }

        let user = self
            .coordinator
            .store()
            .with(|s| s.user_by_email(email).cloned())
            .ok_or_else(|| SessionError::UnknownEmail(email.to_string()))?;

        match &user.endpoint {
            Some(bound) if Some(bound.as_str()) != self.client.endpoint().as_deref() => {
                self.switch_endpoint(bound.clone()).await?;
            }
            _ => {
                // Same endpoint (or none bound): refresh opportunistically
                if let Err(e) = self.coordinator.refresh_all().await {
                    warn!(error = %e, "post-login refresh failed, continuing offline");
                }
            }
        }

        self.coordinator.store().with(|s| s.set_session(Some(&user)))?;
        info!(user = %user.email, "logged in");
        Ok(user)
    }

    fn bootstrap_admin(&self, email: &str) -> Result<AppUser, SessionError> {
        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = AppUser {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_string(),
            role: UserRole::Admin,
            endpoint: self.client.endpoint(),
        };

        self.coordinator.store().with_mut(|s| {
            s.insert_user(user.clone())?;
            s.set_session(Some(&user))
        })?;
        info!(user = %user.email, "bootstrapped admin on fresh install");
        Ok(user)
    }

    /// Clears the session marker. Entities and registry stay cached.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.coordinator.store().with(|s| s.set_session(None))?;
        info!("logged out");
        Ok(())
    }

    /// Validates and adopts a new remote endpoint, then refetches.
    pub async fn configure_endpoint(&self, endpoint: &str) -> Result<(), SessionError> {
        let parsed =
            Url::parse(endpoint).map_err(|_| SessionError::InvalidEndpoint(endpoint.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SessionError::InvalidEndpoint(endpoint.to_string()));
        }
        self.switch_endpoint(endpoint.to_string()).await
    }

    /// Rebinds to `endpoint`: persists it, drops the cached entity
    /// collections, and refetches. A failed refetch leaves the store empty
    /// until connectivity returns; the binding itself stands.
    async fn switch_endpoint(&self, endpoint: String) -> Result<(), SessionError> {
        info!(endpoint = %endpoint, "switching remote endpoint");
        self.coordinator.store().with_mut(|s| {
            s.set_endpoint(Some(&endpoint))?;
            s.clear_endpoint_caches()
        })?;
        self.client.set_endpoint(Some(endpoint));

        if let Err(e) = self.coordinator.refresh_all().await {
            warn!(error = %e, "refresh after endpoint switch failed, starting empty");
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use souk_core::Money;
    use souk_store::{EntityStore, LocalStore, SharedStore};

    fn manager(dir: &tempfile::TempDir) -> SessionManager {
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = EntityStore::new(local);
        store.load();
        let client = Arc::new(RemoteClient::new());
        let coordinator = SyncCoordinator::new(SharedStore::new(store), client.clone());
        SessionManager::new(coordinator, client)
    }

    #[tokio::test]
    async fn test_first_login_bootstraps_admin() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let user = manager.login("owner@souk.example").await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.name, "owner");
        assert_eq!(manager.current_user().unwrap().email, "owner@souk.example");

        manager
            .coordinator()
            .store()
            .with(|s| assert_eq!(s.users.len(), 1));
    }

    #[tokio::test]
    async fn test_unknown_email_rejected_once_registry_exists() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);
        manager.login("owner@souk.example").await.unwrap();

        let result = manager.login("stranger@souk.example").await;
        assert!(matches!(result, Err(SessionError::UnknownEmail(_))));
    }

    #[tokio::test]
    async fn test_login_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);
        manager.login("owner@souk.example").await.unwrap();
        manager.logout().unwrap();

        let user = manager.login("OWNER@souk.example").await.unwrap();
        assert_eq!(user.email, "owner@souk.example");
    }

    #[tokio::test]
    async fn test_empty_email_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);
        assert!(matches!(
            manager.login("   ").await,
            Err(SessionError::EmailRequired)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_session_only() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);
        manager.login("owner@souk.example").await.unwrap();

        manager.logout().unwrap();
        assert!(manager.current_user().is_none());
        manager
            .coordinator()
            .store()
            .with(|s| assert_eq!(s.users.len(), 1));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        assert!(matches!(
            manager.configure_endpoint("not a url").await,
            Err(SessionError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            manager.configure_endpoint("ftp://files.example").await,
            Err(SessionError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_configured_endpoint_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let manager = manager(&dir);
            manager
                .configure_endpoint("http://127.0.0.1:9/exec")
                .await
                .unwrap();
        }

        // Fresh client and store over the same data dir, as after a restart
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = EntityStore::new(local);
        store.load();
        let client = Arc::new(RemoteClient::new());
        let coordinator = SyncCoordinator::new(SharedStore::new(store), client.clone());
        let _manager = SessionManager::new(coordinator, client.clone());

        assert!(client.is_configured());
        assert_eq!(client.endpoint().as_deref(), Some("http://127.0.0.1:9/exec"));
    }

    #[tokio::test]
    async fn test_endpoint_switch_clears_entity_caches() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);
        manager
            .coordinator()
            .store()
            .with_mut(|s| {
                s.insert_product(souk_core::Product {
                    id: "p1".to_string(),
                    name: "Mint Tea".to_string(),
                    price: Money::from_cents(1_200),
                    stock: 10,
                    image: String::new(),
                    category: None,
                    barcode: None,
                })
            })
            .unwrap();

        // Refresh against the unreachable endpoint fails; the binding and
        // the cache clear stand regardless.
        manager
            .configure_endpoint("http://127.0.0.1:9/exec")
            .await
            .unwrap();

        manager.coordinator().store().with(|s| {
            assert!(s.products.is_empty());
            assert_eq!(s.endpoint().as_deref(), Some("http://127.0.0.1:9/exec"));
        });
    }
}
