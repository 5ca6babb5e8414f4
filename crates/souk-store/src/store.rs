//! # Entity Store
//!
//! The single in-memory source of truth for the running session.
//!
//! ## Mutation Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Optimistic-First Mutation                           │
//! │                                                                         │
//! │  UI action ──► EntityStore mutation ──► local mirror write ──► return   │
//! │                      (in memory)         (synchronous fs)               │
//! │                                                                         │
//! │  The remote write happens AFTER this, via the sync coordinator, and     │
//! │  its outcome never rolls the local mutation back: local state is the    │
//! │  assumed-correct view, reconciled by the next full refresh.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is exactly one logical mutator at a time; `SharedStore` wraps the
//! store in `Arc<Mutex<_>>` only so async tasks can reach it, not to enable
//! parallel mutation.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use souk_core::{
    normalize_phone, AppSettings, AppUser, Customer, Expense, Notification, NotificationLevel,
    Product, SaleRecord, LOW_STOCK_THRESHOLD,
};

use crate::error::StoreResult;
use crate::local::{keys, LocalStore, Prefs};

// =============================================================================
// Entity Store
// =============================================================================

/// In-memory authoritative collections, mirrored to durable local storage.
///
/// Every mutating method persists the affected collection(s) before
/// returning. Collections are public for read access; mutation goes through
/// the methods so persistence can never be skipped.
#[derive(Debug)]
pub struct EntityStore {
    local: LocalStore,

    pub products: Vec<Product>,
    pub sales: Vec<SaleRecord>,
    pub expenses: Vec<Expense>,
    pub customers: Vec<Customer>,
    pub users: Vec<AppUser>,
    pub settings: AppSettings,

    /// Deferred notifications (low-stock alerts), drained by the UI loop.
    alerts: Vec<Notification>,
}

impl EntityStore {
    /// Creates an empty store backed by the given mirror.
    pub fn new(local: LocalStore) -> Self {
        EntityStore {
            local,
            products: Vec::new(),
            sales: Vec::new(),
            expenses: Vec::new(),
            customers: Vec::new(),
            users: Vec::new(),
            settings: AppSettings::default(),
            alerts: Vec::new(),
        }
    }

    /// Hydrates every collection from the local mirror.
    ///
    /// Each entity kind loads independently; a malformed document leaves
    /// that collection empty instead of aborting startup.
    pub fn load(&mut self) {
        self.products = self.local.read_or_default(keys::PRODUCTS);
        self.sales = self.local.read_or_default(keys::SALES);
        self.expenses = self.local.read_or_default(keys::EXPENSES);
        self.customers = self.local.read_or_default(keys::CUSTOMERS);
        self.users = self.local.read_or_default(keys::USERS);
        self.settings = self.local.read(keys::SETTINGS).unwrap_or_default();

        info!(
            products = self.products.len(),
            sales = self.sales.len(),
            expenses = self.expenses.len(),
            customers = self.customers.len(),
            users = self.users.len(),
            "entity store hydrated from local mirror"
        );
    }

    /// The backing mirror (for session/endpoint/prefs access).
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    // -------------------------------------------------------------------------
    // Persistence helpers
    // -------------------------------------------------------------------------

    fn persist_products(&self) -> StoreResult<()> {
        self.local.write(keys::PRODUCTS, &self.products)
    }

    fn persist_sales(&self) -> StoreResult<()> {
        self.local.write(keys::SALES, &self.sales)
    }

    fn persist_expenses(&self) -> StoreResult<()> {
        self.local.write(keys::EXPENSES, &self.expenses)
    }

    fn persist_customers(&self) -> StoreResult<()> {
        self.local.write(keys::CUSTOMERS, &self.customers)
    }

    fn persist_users(&self) -> StoreResult<()> {
        self.local.write(keys::USERS, &self.users)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub fn insert_product(&mut self, product: Product) -> StoreResult<()> {
        self.products.push(product);
        self.persist_products()
    }

    /// Replaces the product with the same id. Returns whether a match existed.
    pub fn update_product(&mut self, product: Product) -> StoreResult<bool> {
        let found = match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product;
                true
            }
            None => false,
        };
        self.persist_products()?;
        Ok(found)
    }

    pub fn remove_product(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.persist_products()?;
        Ok(self.products.len() != before)
    }

    /// Wholesale replacement after a successful remote fetch. Queues a
    /// low-stock alert for the incoming collection.
    pub fn replace_products(&mut self, products: Vec<Product>) -> StoreResult<()> {
        self.products = products;
        self.persist_products()?;
        self.queue_low_stock_summary();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Applies one sale line optimistically: appends the record, decrements
    /// the product stock (which may go negative), and upserts the customer
    /// aggregates. All three collections are persisted before returning.
    pub fn apply_sale(&mut self, record: &SaleRecord) -> StoreResult<()> {
        self.sales.push(record.clone());
        self.persist_sales()?;

        if let Some(product) = self.products.iter_mut().find(|p| p.id == record.product.id) {
            product.stock -= record.quantity;
            if product.stock <= LOW_STOCK_THRESHOLD {
                self.alerts.push(Notification::new(
                    NotificationLevel::Warning,
                    format!("Low stock: {} ({} left)", product.name, product.stock),
                ));
            }
        }
        self.persist_products()?;

        self.upsert_customer_for_sale(record);
        self.persist_customers()?;

        debug!(sale = %record.id, product = %record.product.id, "sale applied locally");
        Ok(())
    }

    fn upsert_customer_for_sale(&mut self, record: &SaleRecord) {
        let phone = normalize_phone(&record.customer.phone);
        let existing = self.customers.iter_mut().find(|c| {
            (!record.customer.id.is_empty() && c.id == record.customer.id)
                || c.normalized_phone() == phone
        });

        match existing {
            Some(customer) => {
                customer.total_spent += record.totals.total;
                customer.visit_count += 1;
                customer.last_visit = Some(record.timestamp);
            }
            None => {
                let mut customer = record.customer.clone();
                if customer.id.is_empty() {
                    // Phone doubles as the id so lookups stay stable across
                    // remote syncs that never assigned one.
                    customer.id = phone;
                }
                customer.total_spent = record.totals.total;
                customer.visit_count = 1;
                customer.last_visit = Some(record.timestamp);
                self.customers.push(customer);
            }
        }
    }

    /// Deletes one sale line and restores exactly the quantity it consumed
    /// to the matching product. If the product no longer exists the
    /// restoration is silently skipped.
    pub fn delete_sale(&mut self, id: &str) -> StoreResult<Option<SaleRecord>> {
        let Some(pos) = self.sales.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        let record = self.sales.remove(pos);
        self.persist_sales()?;

        if let Some(product) = self.products.iter_mut().find(|p| p.id == record.product.id) {
            product.stock += record.quantity;
        }
        self.persist_products()?;

        Ok(Some(record))
    }

    pub fn replace_sales(&mut self, sales: Vec<SaleRecord>) -> StoreResult<()> {
        self.sales = sales;
        self.persist_sales()
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    pub fn insert_expense(&mut self, expense: Expense) -> StoreResult<()> {
        self.expenses.push(expense);
        self.persist_expenses()
    }

    pub fn update_expense(&mut self, expense: Expense) -> StoreResult<bool> {
        let found = match self.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        };
        self.persist_expenses()?;
        Ok(found)
    }

    pub fn remove_expense(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        self.persist_expenses()?;
        Ok(self.expenses.len() != before)
    }

    pub fn replace_expenses(&mut self, expenses: Vec<Expense>) -> StoreResult<()> {
        self.expenses = expenses;
        self.persist_expenses()
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    pub fn update_customer(&mut self, customer: Customer) -> StoreResult<bool> {
        let found = match self.customers.iter_mut().find(|c| c.id == customer.id) {
            Some(slot) => {
                *slot = customer;
                true
            }
            None => false,
        };
        self.persist_customers()?;
        Ok(found)
    }

    pub fn remove_customer(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        self.persist_customers()?;
        Ok(self.customers.len() != before)
    }

    pub fn replace_customers(&mut self, customers: Vec<Customer>) -> StoreResult<()> {
        self.customers = customers;
        self.persist_customers()
    }

    /// Finds a customer by normalized phone (the natural key).
    pub fn customer_by_phone(&self, phone: &str) -> Option<&Customer> {
        let phone = normalize_phone(phone);
        self.customers.iter().find(|c| c.normalized_phone() == phone)
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub fn insert_user(&mut self, user: AppUser) -> StoreResult<()> {
        self.users.push(user);
        self.persist_users()
    }

    pub fn update_user(&mut self, user: AppUser) -> StoreResult<bool> {
        let found = match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user;
                true
            }
            None => false,
        };
        self.persist_users()?;
        Ok(found)
    }

    pub fn remove_user(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        self.persist_users()?;
        Ok(self.users.len() != before)
    }

    pub fn replace_users(&mut self, users: Vec<AppUser>) -> StoreResult<()> {
        self.users = users;
        self.persist_users()
    }

    /// Case-insensitive email lookup (the login natural key).
    pub fn user_by_email(&self, email: &str) -> Option<&AppUser> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Replaces the settings singleton and persists the structured form.
    pub fn set_settings(&mut self, settings: AppSettings) -> StoreResult<()> {
        self.settings = settings;
        self.local.write(keys::SETTINGS, &self.settings)
    }

    /// Persists the current settings (used after an in-place merge).
    pub fn persist_settings(&self) -> StoreResult<()> {
        self.local.write(keys::SETTINGS, &self.settings)
    }

    // -------------------------------------------------------------------------
    // Session / endpoint / prefs (thin mirror accessors)
    // -------------------------------------------------------------------------

    pub fn session(&self) -> Option<AppUser> {
        self.local.read(keys::SESSION)
    }

    pub fn set_session(&self, user: Option<&AppUser>) -> StoreResult<()> {
        match user {
            Some(user) => self.local.write(keys::SESSION, user),
            None => self.local.remove(keys::SESSION),
        }
    }

    pub fn endpoint(&self) -> Option<String> {
        self.local.read(keys::ENDPOINT)
    }

    pub fn set_endpoint(&self, endpoint: Option<&str>) -> StoreResult<()> {
        match endpoint {
            Some(endpoint) => self.local.write(keys::ENDPOINT, &endpoint),
            None => self.local.remove(keys::ENDPOINT),
        }
    }

    pub fn prefs(&self) -> Prefs {
        self.local.read_or_default(keys::PREFS)
    }

    pub fn set_prefs(&self, prefs: Prefs) -> StoreResult<()> {
        self.local.write(keys::PREFS, &prefs)
    }

    // -------------------------------------------------------------------------
    // Endpoint switching
    // -------------------------------------------------------------------------

    /// Clears the per-store caches when rebinding to a different remote
    /// endpoint. Users and settings deliberately survive: the registry and
    /// preferences belong to the installation, not the endpoint.
    pub fn clear_endpoint_caches(&mut self) -> StoreResult<()> {
        self.products.clear();
        self.sales.clear();
        self.expenses.clear();
        self.customers.clear();
        self.persist_products()?;
        self.persist_sales()?;
        self.persist_expenses()?;
        self.persist_customers()?;
        info!("cleared cached entities for endpoint switch");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Low-stock alerts
    // -------------------------------------------------------------------------

    /// Queues one summary alert enumerating every product at or below the
    /// threshold. Evaluated after a bulk replace.
    pub fn queue_low_stock_summary(&mut self) {
        let low: Vec<&str> = self
            .products
            .iter()
            .filter(|p| p.is_low_stock())
            .map(|p| p.name.as_str())
            .collect();

        if !low.is_empty() {
            self.alerts.push(Notification::new(
                NotificationLevel::Warning,
                format!("{} product(s) almost out of stock: {}", low.len(), low.join(", ")),
            ));
        }
    }

    /// Drains the deferred alert queue.
    pub fn take_alerts(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.alerts)
    }
}

// =============================================================================
// Shared Store
// =============================================================================

/// Thread-safe handle to the entity store.
///
/// There is one logical mutator at a time by construction; the mutex exists
/// so async flows (refresh, checkout loop) and the UI thread can share the
/// store, and operations are short enough that a plain `Mutex` beats the
/// complexity of `RwLock`.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<EntityStore>>,
}

impl SharedStore {
    pub fn new(store: EntityStore) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Opens the mirror, hydrates the store, and wraps it.
    pub fn open(local: LocalStore) -> Self {
        let mut store = EntityStore::new(local);
        store.load();
        Self::new(store)
    }

    /// Executes a closure with read access to the store.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityStore) -> R,
    {
        let store = self.inner.lock().expect("entity store mutex poisoned");
        f(&store)
    }

    /// Executes a closure with write access to the store.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut EntityStore) -> R,
    {
        let mut store = self.inner.lock().expect("entity store mutex poisoned");
        f(&mut store)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
