//! # Sync Coordinator
//!
//! Glue between the entity store and the remote backend, implementing the
//! offline-first contract:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Write-and-Sync Contract                             │
//! │                                                                         │
//! │   mutation ──► apply to EntityStore ──► durable local write ──► done    │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                   remote POST (awaited)                 │
//! │                                              │                          │
//! │                              success ──► true │ failure ──► false       │
//! │                                                                         │
//! │   The bool feeds the caller's status surface. It NEVER rolls back the   │
//! │   local mutation: local state is authoritative until the next refresh.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A full refresh is the only path by which remote state overwrites local
//! state, and it replaces collections wholesale, one per key present in the
//! snapshot.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use souk_core::{AppSettings, AppUser, Customer, Expense, Product, SaleRecord};
use souk_store::{flatten, merge_entries, SettingEntry, SharedStore, StoreResult};

use crate::error::SyncResult;
use crate::protocol::{MutationAction, MutationRequest};
use crate::remote::RemoteBackend;

// =============================================================================
// Refresh Summary
// =============================================================================

/// What a full refresh actually touched. A `None` count means the snapshot
/// omitted that collection and local state was left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub products: Option<usize>,
    pub sales: Option<usize>,
    pub expenses: Option<usize>,
    pub customers: Option<usize>,
    pub users: Option<usize>,
    pub settings_merged: bool,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Pairs the shared entity store with a remote backend.
#[derive(Clone)]
pub struct SyncCoordinator {
    store: SharedStore,
    remote: Arc<dyn RemoteBackend>,
}

impl SyncCoordinator {
    pub fn new(store: SharedStore, remote: Arc<dyn RemoteBackend>) -> Self {
        SyncCoordinator { store, remote }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn remote(&self) -> &Arc<dyn RemoteBackend> {
        &self.remote
    }

    // -------------------------------------------------------------------------
    // Full refresh
    // -------------------------------------------------------------------------

    /// Fetches the remote snapshot and replaces every collection the
    /// snapshot carries. On fetch failure local state is untouched.
    pub async fn refresh_all(&self) -> SyncResult<RefreshSummary> {
        let snapshot = self.remote.fetch_snapshot().await?;

        let summary = self.store.with_mut(|store| -> StoreResult<RefreshSummary> {
            let mut summary = RefreshSummary::default();

            if let Some(products) = snapshot.products {
                summary.products = Some(products.len());
                store.replace_products(products)?;
            }
            if let Some(sales) = snapshot.sales {
                summary.sales = Some(sales.len());
                store.replace_sales(sales)?;
            }
            if let Some(expenses) = snapshot.expenses {
                summary.expenses = Some(expenses.len());
                store.replace_expenses(expenses)?;
            }
            if let Some(customers) = snapshot.customers {
                summary.customers = Some(customers.len());
                store.replace_customers(customers)?;
            }
            if let Some(users) = snapshot.users {
                summary.users = Some(users.len());
                store.replace_users(users)?;
            }
            if let Some(entries) = snapshot.settings {
                merge_entries(&mut store.settings, &entries);
                store.persist_settings()?;
                summary.settings_merged = true;
            }

            Ok(summary)
        })?;

        info!(?summary, "full refresh applied");
        Ok(summary)
    }

    // -------------------------------------------------------------------------
    // Write-and-sync
    // -------------------------------------------------------------------------

    /// Sends one mutation and collapses every failure mode into `false`.
    /// The caller's local mutation has already happened by the time this
    /// runs, so there is nothing left to propagate.
    pub async fn write_and_sync<T: Serialize>(&self, action: MutationAction, payload: &T) -> bool {
        let request = match MutationRequest::new(action, payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(?action, error = %e, "could not encode mutation");
                return false;
            }
        };
        self.send_request(&request).await
    }

    async fn send_request(&self, request: &MutationRequest) -> bool {
        match self.remote.send(request).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(
                    action = ?request.action,
                    message = ?response.message,
                    "remote rejected mutation"
                );
                false
            }
            Err(e) => {
                warn!(action = ?request.action, error = %e, "remote write failed");
                false
            }
        }
    }

    async fn delete_and_sync(&self, action: MutationAction, id: &str) -> bool {
        self.send_request(&MutationRequest::for_id(action, id)).await
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub async fn save_product(&self, product: Product) -> StoreResult<bool> {
        self.store.with_mut(|s| s.insert_product(product.clone()))?;
        Ok(self.write_and_sync(MutationAction::SaveProduct, &product).await)
    }

    /// Updates a product. `None` means no such product exists locally; the
    /// remote write is skipped so the caller can surface the miss by name.
    pub async fn update_product(&self, product: Product) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.update_product(product.clone()))? {
            warn!(product = %product.id, "update target missing locally");
            return Ok(None);
        }
        Ok(Some(
            self.write_and_sync(MutationAction::UpdateProduct, &product).await,
        ))
    }

    pub async fn delete_product(&self, id: &str) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.remove_product(id))? {
            warn!(product = %id, "delete target missing locally");
            return Ok(None);
        }
        Ok(Some(self.delete_and_sync(MutationAction::DeleteProduct, id).await))
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Applies one sale line locally (stock decrement, customer aggregates)
    /// and pushes it to the remote. The local application stands regardless
    /// of the remote outcome.
    pub async fn record_sale(&self, record: &SaleRecord) -> StoreResult<bool> {
        self.store.with_mut(|s| s.apply_sale(record))?;
        Ok(self.write_and_sync(MutationAction::Sale, record).await)
    }

    /// Deletes a sale, restoring its stock. Returns `None` if the sale was
    /// unknown locally (no remote write is attempted).
    pub async fn delete_sale(&self, id: &str) -> StoreResult<Option<bool>> {
        let removed = self.store.with_mut(|s| s.delete_sale(id))?;
        if removed.is_none() {
            return Ok(None);
        }
        Ok(Some(self.delete_and_sync(MutationAction::DeleteSale, id).await))
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    pub async fn save_expense(&self, expense: Expense) -> StoreResult<bool> {
        self.store.with_mut(|s| s.insert_expense(expense.clone()))?;
        Ok(self.write_and_sync(MutationAction::SaveExpense, &expense).await)
    }

    pub async fn update_expense(&self, expense: Expense) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.update_expense(expense.clone()))? {
            warn!(expense = %expense.id, "update target missing locally");
            return Ok(None);
        }
        Ok(Some(
            self.write_and_sync(MutationAction::UpdateExpense, &expense).await,
        ))
    }

    pub async fn delete_expense(&self, id: &str) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.remove_expense(id))? {
            warn!(expense = %id, "delete target missing locally");
            return Ok(None);
        }
        Ok(Some(self.delete_and_sync(MutationAction::DeleteExpense, id).await))
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    pub async fn update_customer(&self, customer: Customer) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.update_customer(customer.clone()))? {
            warn!(customer = %customer.id, "update target missing locally");
            return Ok(None);
        }
        Ok(Some(
            self.write_and_sync(MutationAction::UpdateCustomer, &customer).await,
        ))
    }

    pub async fn delete_customer(&self, id: &str) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.remove_customer(id))? {
            warn!(customer = %id, "delete target missing locally");
            return Ok(None);
        }
        Ok(Some(self.delete_and_sync(MutationAction::DeleteCustomer, id).await))
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn save_user(&self, user: AppUser) -> StoreResult<bool> {
        self.store.with_mut(|s| s.insert_user(user.clone()))?;
        Ok(self.write_and_sync(MutationAction::SaveUser, &user).await)
    }

    pub async fn update_user(&self, user: AppUser) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.update_user(user.clone()))? {
            warn!(user = %user.id, "update target missing locally");
            return Ok(None);
        }
        Ok(Some(
            self.write_and_sync(MutationAction::UpdateUser, &user).await,
        ))
    }

    pub async fn delete_user(&self, id: &str) -> StoreResult<Option<bool>> {
        if !self.store.with_mut(|s| s.remove_user(id))? {
            warn!(user = %id, "delete target missing locally");
            return Ok(None);
        }
        Ok(Some(self.delete_and_sync(MutationAction::DeleteUser, id).await))
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Replaces the settings locally, then pushes the complete flattened
    /// sheet in one request.
    pub async fn save_settings(&self, settings: AppSettings) -> StoreResult<bool> {
        let entries = flatten(&settings);
        self.store.with_mut(|s| s.set_settings(settings))?;

        #[derive(Serialize)]
        struct Payload {
            settings: Vec<SettingEntry>,
        }
        Ok(self
            .write_and_sync(MutationAction::SaveSettings, &Payload { settings: entries })
            .await)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use souk_core::{Language, Money};
    use souk_store::{EntityStore, LocalStore, SettingEntry};

    use crate::error::SyncError;
    use crate::protocol::{MutationResponse, RemoteSnapshot};

    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend scripted per test: a canned snapshot, a fixed answer for
    /// every send, and a counter of how many sends were attempted.
    struct ScriptedBackend {
        snapshot: Option<RemoteSnapshot>,
        accept_writes: bool,
        sends: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(snapshot: Option<RemoteSnapshot>, accept_writes: bool) -> Self {
            ScriptedBackend {
                snapshot,
                accept_writes,
                sends: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteBackend for ScriptedBackend {
        async fn fetch_snapshot(&self) -> SyncResult<RemoteSnapshot> {
            self.snapshot
                .clone()
                .ok_or(SyncError::EndpointNotConfigured)
        }

        async fn send(&self, _request: &MutationRequest) -> SyncResult<MutationResponse> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.accept_writes {
                Ok(MutationResponse::success())
            } else {
                Err(SyncError::Status(500))
            }
        }
    }

    fn coordinator(
        dir: &tempfile::TempDir,
        backend: Arc<ScriptedBackend>,
    ) -> SyncCoordinator {
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = EntityStore::new(local);
        store.load();
        SyncCoordinator::new(SharedStore::new(store), backend)
    }

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_cents(5_000),
            stock,
            image: String::new(),
            category: None,
            barcode: None,
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_only_present_collections() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            &dir,
            Arc::new(ScriptedBackend::new(
                Some(RemoteSnapshot {
                    products: Some(vec![product("p1", 20), product("p2", 3)]),
                    settings: Some(vec![SettingEntry::new("language", "ar")]),
                    ..RemoteSnapshot::default()
                }),
                true,
            )),
        );
        coordinator
            .store()
            .with_mut(|s| {
                s.insert_expense(Expense {
                    id: "e1".to_string(),
                    title: "Rent".to_string(),
                    description: None,
                    amount: Money::from_cents(50_000),
                    date: chrono::Utc::now(),
                    image: None,
                })
            })
            .unwrap();

        let summary = coordinator.refresh_all().await.unwrap();

        assert_eq!(summary.products, Some(2));
        assert_eq!(summary.expenses, None);
        assert!(summary.settings_merged);

        coordinator.store().with(|s| {
            assert_eq!(s.products.len(), 2);
            assert_eq!(s.expenses.len(), 1); // untouched, key absent
            assert_eq!(s.settings.language, Language::Ar);
            assert_eq!(s.settings.currency, "MAD"); // merge is additive
        });

        // The incoming p2 sits at stock 3, so the replace queued an alert
        let alerts = coordinator.store().with_mut(|s| s.take_alerts());
        assert_eq!(alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(ScriptedBackend::new(None, true)));
        coordinator
            .store()
            .with_mut(|s| s.insert_product(product("p1", 10)))
            .unwrap();

        assert!(coordinator.refresh_all().await.is_err());
        coordinator
            .store()
            .with(|s| assert_eq!(s.products.len(), 1));
    }

    #[tokio::test]
    async fn test_local_mutation_stands_when_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(ScriptedBackend::new(None, false)));

        let synced = coordinator.save_product(product("p1", 10)).await.unwrap();
        assert!(!synced);
        coordinator
            .store()
            .with(|s| assert_eq!(s.products.len(), 1));
    }

    #[tokio::test]
    async fn test_delete_unknown_sale_skips_remote() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(ScriptedBackend::new(None, true)));

        let outcome = coordinator.delete_sale("ghost").await.unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_update_and_delete_surface_missing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::new(None, true));
        let coordinator = coordinator(&dir, backend.clone());

        // Ghost targets: reported as None, and nothing goes over the wire
        assert_eq!(coordinator.update_product(product("ghost", 1)).await.unwrap(), None);
        assert_eq!(coordinator.delete_product("ghost").await.unwrap(), None);
        assert_eq!(coordinator.delete_expense("ghost").await.unwrap(), None);
        assert_eq!(coordinator.delete_customer("ghost").await.unwrap(), None);
        assert_eq!(coordinator.delete_user("ghost").await.unwrap(), None);
        assert_eq!(backend.sends.load(Ordering::SeqCst), 0);

        // A real target round-trips as Some(synced)
        coordinator
            .store()
            .with_mut(|s| s.insert_product(product("p1", 10)))
            .unwrap();
        let mut edited = product("p1", 7);
        edited.name = "Renamed".to_string();
        assert_eq!(coordinator.update_product(edited).await.unwrap(), Some(true));
        assert_eq!(backend.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_save_settings_applies_locally_first() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(ScriptedBackend::new(None, false)));

        let mut settings = AppSettings::default();
        settings.store_name = "Souk Central".to_string();
        let synced = coordinator.save_settings(settings).await.unwrap();

        assert!(!synced);
        coordinator
            .store()
            .with(|s| assert_eq!(s.settings.store_name, "Souk Central"));
    }
}
