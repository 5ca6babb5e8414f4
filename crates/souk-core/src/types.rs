//! # Domain Types
//!
//! Core domain types used throughout Souk POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   SaleRecord    │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (per line)  │   │  id             │       │
//! │  │  price (Money)  │   │  product (snap) │   │  phone (natural │       │
//! │  │  stock          │   │  totals frozen  │   │   key)          │       │
//! │  │  barcode?       │   │  order timestamp│   │  aggregates     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Expense • AppUser • AppSettings • Notification                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `SaleRecord` is one *line item*; an order is the set of records that
//! share a checkout timestamp, reconstructed by grouping, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::{DiscountSpec, LineTotals, TaxRate};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4, or whatever the remote store assigned).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Current stock level. May go negative transiently: sales apply
    /// optimistically without server-side re-validation.
    pub stock: i64,

    /// Image reference (hosted URL or data URL).
    pub image: String,

    /// Optional category tag. Deleting a category from settings does not
    /// cascade here; orphaned tags are tolerated.
    pub category: Option<String>,

    /// Optional barcode, unique among products that have one.
    pub barcode: Option<String>,
}

impl Product {
    /// Whether any quantity of this product can currently be added to a cart.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the product has crossed the low-stock alert threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, de-duplicated by normalized phone number.
///
/// `total_spent` is a monotonically non-decreasing accumulator and
/// `visit_count` increases by one per sale; both are derived from the sales
/// ledger and updated at checkout time, never recomputed from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    /// Primary lookup key. Falls back to the phone number when the remote
    /// store never assigned one, which keeps ids stable across syncs.
    pub id: String,
    pub name: String,
    /// Natural key for de-duplication (compared after [`normalize_phone`]).
    pub phone: String,
    pub address: String,
    #[ts(as = "Option<String>")]
    pub last_visit: Option<DateTime<Utc>>,
    pub total_spent: Money,
    pub visit_count: i64,
}

impl Customer {
    /// Phone with whitespace stripped; the de-duplication key.
    pub fn normalized_phone(&self) -> String {
        normalize_phone(&self.phone)
    }
}

/// Strips all whitespace from a phone number so that "06 00 00 00 00" and
/// "0600000000" identify the same customer.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// Sale Record
// =============================================================================

/// One product line within an order, as shown on the consolidated receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: i64,
    pub total: Money,
}

/// One sale line item. Uses the snapshot pattern: product data is frozen at
/// checkout so later edits never rewrite history.
///
/// The id is unique **per line item**, not per order; all lines of one
/// checkout share `timestamp`, which is the grouping key for order display
/// and receipt reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,

    /// Product snapshot at time of sale (frozen).
    pub product: Product,

    /// Quantity sold on this line.
    pub quantity: i64,

    /// The raw discount rule as entered, kept for auditability.
    pub discount: DiscountSpec,

    /// Tax rate applied to this line (frozen).
    pub tax_rate: TaxRate,

    /// Monetary breakdown computed at creation time and never recomputed.
    /// Invariant: `totals.total == totals.subtotal - totals.discount + totals.tax`.
    pub totals: LineTotals,

    /// Customer embedded at time of sale (not a foreign key).
    pub customer: Customer,

    /// Checkout timestamp shared by every line item of the same order.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Sibling cart lines, only ever populated on a receipt-bound record
    /// for re-grouping. Not canonical storage; persisted records carry None.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_lines: Option<Vec<OrderLine>>,
}

impl SaleRecord {
    /// The final line total.
    #[inline]
    pub fn total(&self) -> Money {
        self.totals.total
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense, independent of every other entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Optional receipt image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// =============================================================================
// App User
// =============================================================================

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

/// A registered operator. Email is the natural key for login, compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Optional remote-endpoint override: logging in as this user rebinds
    /// the whole installation to that endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl AppUser {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// App Settings
// =============================================================================

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

/// Receipt paper size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptSize {
    Thermal,
    A4,
}

/// Process-wide settings singleton. Persisted locally as one JSON document
/// and mirrored remotely as flattened key/value pairs (see the settings
/// serialization boundary in souk-store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppSettings {
    pub language: Language,
    /// Currency symbol/code as displayed; pricing never interprets it.
    pub currency: String,
    pub receipt_size: ReceiptSize,
    pub store_name: String,
    pub store_logo: String,
    pub tax_rate: TaxRate,
    /// Ordered category names. Uniqueness is expected but not enforced.
    pub categories: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            language: Language::En,
            currency: "MAD".to_string(),
            receipt_size: ReceiptSize::Thermal,
            store_name: "My Store".to_string(),
            store_logo: String::new(),
            tax_rate: TaxRate::zero(),
            categories: vec!["General".to_string()],
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a transient, auto-dismissing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
    Warning,
}

/// A transient user-facing message. Nothing in the system is fatal; every
/// failure path degrades to one of these plus "local state may be ahead".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Notification {
            id: uuid::Uuid::new_v4().to_string(),
            level,
            message: message.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
