//! # Checkout
//!
//! Turns a cart into sale records, one per line, sharing a single order
//! timestamp.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate ──► resolve customer ──► for each line (in order):            │
//! │                                       apply locally (durable)           │
//! │                                       await remote write ──► tally      │
//! │                                                                         │
//! │  all synced    ──► Completed  (cart cleared)                            │
//! │  some synced   ──► Partial    (cart cleared, "N of M" reported)         │
//! │  none synced   ──► Failed     (cart preserved for retry)                │
//! │                                                                         │
//! │  Local application always happens for every line, whatever the remote  │
//! │  outcome. Retrying a Failed checkout therefore applies the sales       │
//! │  again; the refresh reconciles.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use souk_core::{
    validation::validate_customer_input, normalize_phone, CartTotals, CoreError, Customer, Money,
    OrderLine, SaleRecord,
};
use souk_store::StoreError;
use souk_sync::SyncCoordinator;

use crate::cart::Cart;

// =============================================================================
// Types
// =============================================================================

/// Customer details as typed at the register. Name and phone are required;
/// the phone is the natural key for returning customers.
#[derive(Debug, Clone, Default)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One printed receipt line.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub total: Money,
}

/// The consolidated receipt for the whole order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Receipt {
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub store_name: String,
    pub currency: String,
    pub customer_name: String,
    pub lines: Vec<ReceiptLine>,
    pub totals: CartTotals,
}

/// How checkout ended.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Every line reached the remote.
    Completed { receipt: Receipt },
    /// Some lines reached the remote. All lines were applied locally.
    Partial {
        saved: usize,
        total: usize,
        receipt: Receipt,
    },
    /// No line reached the remote. Lines were still applied locally; the
    /// cart is preserved so the cashier can retry.
    Failed { total: usize },
}

impl CheckoutOutcome {
    /// One-line status for the register display.
    pub fn describe(&self) -> String {
        match self {
            CheckoutOutcome::Completed { .. } => "Order completed".to_string(),
            CheckoutOutcome::Partial { saved, total, .. } => {
                format!("Order saved locally, {saved} of {total} lines synced")
            }
            CheckoutOutcome::Failed { total } => {
                format!("Order saved locally, 0 of {total} lines synced")
            }
        }
    }
}

/// Checkout failures. These happen before any line is applied; once the
/// line loop starts, remote trouble is an outcome, not an error.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Checkout
// =============================================================================

/// Runs the checkout flow against the coordinator's store and remote.
///
/// The cart is cleared when at least one line synced, preserved otherwise.
pub async fn checkout(
    coordinator: &SyncCoordinator,
    cart: &mut Cart,
    input: &CustomerInput,
) -> Result<CheckoutOutcome, CheckoutError> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }
    validate_customer_input(&input.name, &input.phone).map_err(CoreError::from)?;

    let customer = resolve_customer(coordinator, input);
    let timestamp = Utc::now();
    let order_id = Uuid::new_v4().to_string();
    let total_lines = cart.len();

    // The full order summary rides on the first record so a single fetched
    // record can regenerate the consolidated receipt.
    let order_lines: Vec<OrderLine> = cart
        .lines()
        .iter()
        .map(|line| OrderLine {
            product_name: line.name.clone(),
            quantity: line.quantity,
            total: line.totals.total,
        })
        .collect();

    let mut saved = 0usize;
    for (index, line) in cart.lines().iter().enumerate() {
        let product = coordinator
            .store()
            .with(|s| s.products.iter().find(|p| p.id == line.product_id).cloned())
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let record = SaleRecord {
            id: format!("{order_id}-{}", index + 1),
            product,
            quantity: line.quantity,
            discount: line.discount,
            tax_rate: line.tax_rate,
            totals: line.totals,
            customer: customer.clone(),
            timestamp,
            order_lines: if index == 0 && total_lines > 1 {
                Some(order_lines.clone())
            } else {
                None
            },
        };

        if coordinator.record_sale(&record).await? {
            saved += 1;
        } else {
            warn!(sale = %record.id, "sale line applied locally but not synced");
        }
    }

    info!(order = %order_id, saved, total = total_lines, "checkout finished");

    let receipt = Receipt {
        order_id,
        timestamp,
        store_name: coordinator.store().with(|s| s.settings.store_name.clone()),
        currency: coordinator.store().with(|s| s.settings.currency.clone()),
        customer_name: customer.name.clone(),
        lines: cart
            .lines()
            .iter()
            .map(|line| ReceiptLine {
                name: line.name.clone(),
                quantity: line.quantity,
                total: line.totals.total,
            })
            .collect(),
        totals: cart.totals(),
    };

    let outcome = if saved == total_lines {
        cart.clear();
        CheckoutOutcome::Completed { receipt }
    } else if saved > 0 {
        cart.clear();
        CheckoutOutcome::Partial {
            saved,
            total: total_lines,
            receipt,
        }
    } else {
        CheckoutOutcome::Failed { total: total_lines }
    };

    Ok(outcome)
}

/// Finds the returning customer by normalized phone, or builds a fresh one.
/// A fresh customer gets a new id; the store assigns aggregates on first
/// sale application.
fn resolve_customer(coordinator: &SyncCoordinator, input: &CustomerInput) -> Customer {
    let existing = coordinator
        .store()
        .with(|s| s.customer_by_phone(&input.phone).cloned());

    match existing {
        Some(customer) => customer,
        None => Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: normalize_phone(&input.phone),
            address: input.address.trim().to_string(),
            last_visit: None,
            total_spent: Money::zero(),
            visit_count: 0,
        },
    }
}
