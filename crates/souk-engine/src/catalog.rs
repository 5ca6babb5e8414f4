//! # Catalog
//!
//! Validated admin flows for products and expenses. Validation runs before
//! anything is touched: a rejected save leaves both local and remote state
//! exactly as they were.

use thiserror::Error;

use souk_core::{validation, CoreError, Expense, Product};
use souk_store::StoreError;
use souk_sync::SyncCoordinator;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<souk_core::ValidationError> for CatalogError {
    fn from(e: souk_core::ValidationError) -> Self {
        CatalogError::Core(e.into())
    }
}

/// Validates and saves a new product. Returns whether the remote write
/// succeeded; the local save already happened either way.
pub async fn save_product(
    coordinator: &SyncCoordinator,
    product: Product,
) -> Result<bool, CatalogError> {
    coordinator
        .store()
        .with(|s| validation::validate_product(&product, &s.products, None))?;
    Ok(coordinator.save_product(product).await?)
}

/// Validates and saves an edit to an existing product. The product's own
/// barcode is excluded from the uniqueness check; a locally missing target
/// is a named failure, not a silent success.
pub async fn update_product(
    coordinator: &SyncCoordinator,
    product: Product,
) -> Result<bool, CatalogError> {
    coordinator
        .store()
        .with(|s| validation::validate_product(&product, &s.products, Some(&product.id)))?;
    let id = product.id.clone();
    coordinator
        .update_product(product)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id).into())
}

/// Validates and records a new expense.
pub async fn save_expense(
    coordinator: &SyncCoordinator,
    expense: Expense,
) -> Result<bool, CatalogError> {
    validation::validate_expense(&expense.title, expense.amount)?;
    Ok(coordinator.save_expense(expense).await?)
}

/// Validates and saves an edit to an existing expense. A locally missing
/// target is a named failure.
pub async fn update_expense(
    coordinator: &SyncCoordinator,
    expense: Expense,
) -> Result<bool, CatalogError> {
    validation::validate_expense(&expense.title, expense.amount)?;
    let id = expense.id.clone();
    coordinator
        .update_expense(expense)
        .await?
        .ok_or_else(|| CoreError::ExpenseNotFound(id).into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use souk_core::Money;
    use souk_store::{EntityStore, LocalStore, SharedStore};
    use souk_sync::RemoteClient;

    fn coordinator(dir: &tempfile::TempDir) -> SyncCoordinator {
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = EntityStore::new(local);
        store.load();
        SyncCoordinator::new(SharedStore::new(store), Arc::new(RemoteClient::new()))
    }

    fn product(id: &str, barcode: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_cents(1_000),
            stock: 10,
            image: String::new(),
            category: None,
            barcode: barcode.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir);
        save_product(&coordinator, product("p1", Some("6111")))
            .await
            .unwrap();

        let result = save_product(&coordinator, product("p2", Some("6111"))).await;
        assert!(result.is_err());
        coordinator
            .store()
            .with(|s| assert_eq!(s.products.len(), 1));
    }

    #[tokio::test]
    async fn test_product_can_keep_its_own_barcode_on_edit() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir);
        save_product(&coordinator, product("p1", Some("6111")))
            .await
            .unwrap();

        let mut edited = product("p1", Some("6111"));
        edited.name = "Renamed".to_string();
        update_product(&coordinator, edited).await.unwrap();

        coordinator
            .store()
            .with(|s| assert_eq!(s.products[0].name, "Renamed"));
    }

    #[tokio::test]
    async fn test_update_of_missing_product_is_named_failure() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir);

        let result = update_product(&coordinator, product("ghost", None)).await;
        assert!(matches!(
            result,
            Err(CatalogError::Core(CoreError::ProductNotFound(id))) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_update_of_missing_expense_is_named_failure() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir);

        let expense = Expense {
            id: "ghost".to_string(),
            title: "Rent".to_string(),
            description: None,
            amount: Money::from_cents(50_000),
            date: chrono::Utc::now(),
            image: None,
        };
        let result = update_expense(&coordinator, expense).await;
        assert!(matches!(
            result,
            Err(CatalogError::Core(CoreError::ExpenseNotFound(id))) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_invalid_expense_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir);

        let expense = Expense {
            id: "e1".to_string(),
            title: "Rent".to_string(),
            description: None,
            amount: Money::zero(),
            date: chrono::Utc::now(),
            image: None,
        };
        assert!(save_expense(&coordinator, expense).await.is_err());
        coordinator
            .store()
            .with(|s| assert!(s.expenses.is_empty()));
    }
}
