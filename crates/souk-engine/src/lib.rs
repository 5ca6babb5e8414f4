//! # souk-engine: Cart, Checkout, Session Orchestration
//!
//! The top layer of Souk POS: everything a register session actually does,
//! expressed over the store and sync layers below.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SessionManager ──► login / logout / endpoint binding                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Cart ──► add/edit lines ──► checkout() ──► CheckoutOutcome            │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         SyncCoordinator (souk-sync)                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

pub use cart::{Cart, CartLine};
pub use catalog::CatalogError;
pub use checkout::{
    checkout, CheckoutError, CheckoutOutcome, CustomerInput, Receipt, ReceiptLine,
};
pub use session::{SessionError, SessionManager};
