//! # souk-core: Pure Business Logic for Souk POS
//!
//! This crate is the **heart** of Souk POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Souk POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   souk-engine (orchestration)                   │   │
//! │  │        Cart ──► Checkout ──► Session / Identity                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌──────────────┐   ┌──────────▼──────────┐                            │
//! │  │  souk-sync   │──►│     souk-store      │                            │
//! │  │  (remote)    │   │  (entity collections │                           │
//! │  └──────┬───────┘   │   + local mirror)   │                            │
//! │         │           └──────────┬──────────┘                            │
//! │  ┌──────▼──────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ souk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ Discount  │  │   rules   │  │   │
//! │  │   │ SaleRecord│  │ (integer) │  │ Tax, Line │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: network and file system access are FORBIDDEN here
//! 3. **Integer Money**: monetary values are minor units (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_line, CartTotals, DiscountSpec, LineTotals, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product is flagged for the low-stock
/// alert. A bulk replace and every sale-driven decrement re-evaluate this.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum lines allowed in a single cart. Prevents runaway carts; repeated
/// add-to-cart of the same product deliberately creates separate lines, so
/// the bound is on lines, not distinct products.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line. Prevents accidental
/// over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
