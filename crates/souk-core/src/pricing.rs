//! # Pricing Calculator
//!
//! Pure line-item and cart pricing: subtotal, discount, tax, final total.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price × quantity ──► subtotal                                     │
//! │                               │                                         │
//! │  DiscountSpec ───────────────►│  percentage: clamped at 100%            │
//! │  (raw entered rule)           │  fixed: clamped at subtotal             │
//! │                               ▼                                         │
//! │                       discount amount                                   │
//! │                               │                                         │
//! │  taxable = subtotal - discount                                          │
//! │  tax     = taxable × tax_rate                                           │
//! │  total   = taxable + tax                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The raw discount rule is stored, not the derived amount: changing a
//! line's quantity re-runs this same pipeline against the new subtotal with
//! the originally entered percentage/fixed value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (bps).
///
/// 1 basis point = 0.01%, so 750 bps = 7.5%. Settings carry the rate as a
/// decimal percentage (e.g. `7.5`); it is converted once on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a decimal percentage (`7.5` means 7.5%).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a decimal percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Discount Spec
// =============================================================================

/// The raw discount rule entered on a cart line.
///
/// This is the *input*, not the computed amount. A `SaleRecord` stores both:
/// the spec for auditability and the derived amount frozen at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountSpec {
    /// Percentage off the line subtotal, in basis points (1500 = 15%).
    /// Values above 10000 are tolerated on input and clamped when applied.
    Percentage(u32),
    /// Flat amount off the line subtotal, clamped at the subtotal when
    /// applied so a line total can never go negative.
    Fixed(Money),
}

impl DiscountSpec {
    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        DiscountSpec::Fixed(Money::zero())
    }

    /// Builds a percentage discount from a decimal percent (`15.0` = 15%).
    pub fn percentage(pct: f64) -> Self {
        DiscountSpec::Percentage((pct * 100.0).round().max(0.0) as u32)
    }

    /// Computes the discount amount this rule yields on a given subtotal.
    ///
    /// ## Clamping
    /// - Percentage is capped at 100%, so the amount never exceeds the
    ///   subtotal on that path.
    /// - Fixed amounts are clamped to `[0, subtotal]`.
    pub fn amount_on(&self, subtotal: Money) -> Money {
        match *self {
            DiscountSpec::Percentage(bps) => subtotal.scale_bps(bps.min(10_000)),
            DiscountSpec::Fixed(amount) => amount.clamp(Money::zero(), subtotal),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, DiscountSpec::Fixed(m) if m.is_zero())
    }
}

impl Default for DiscountSpec {
    fn default() -> Self {
        DiscountSpec::none()
    }
}

// =============================================================================
// Line Totals
// =============================================================================

/// The computed monetary breakdown of one line item.
///
/// Invariant: `total == subtotal - discount + tax` (equivalently
/// `taxable + tax`). Computed once by [`compute_line`] and never
/// recomputed retroactively on persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub taxable: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes the full monetary breakdown of a single line item.
///
/// Pure and deterministic: identical inputs always produce identical output.
///
/// ## Example
/// ```rust
/// use souk_core::{compute_line, DiscountSpec, Money, TaxRate};
///
/// // 2 × 100.00, fixed 20.00 off, 10% tax
/// let totals = compute_line(
///     Money::from_cents(10_000),
///     2,
///     DiscountSpec::Fixed(Money::from_cents(2_000)),
///     TaxRate::from_percentage(10.0),
/// );
/// assert_eq!(totals.subtotal.cents(), 20_000);
/// assert_eq!(totals.discount.cents(), 2_000);
/// assert_eq!(totals.taxable.cents(), 18_000);
/// assert_eq!(totals.tax.cents(), 1_800);
/// assert_eq!(totals.total.cents(), 19_800);
/// ```
pub fn compute_line(
    unit_price: Money,
    quantity: i64,
    discount: DiscountSpec,
    tax_rate: TaxRate,
) -> LineTotals {
    let subtotal = unit_price.multiply_quantity(quantity);
    let discount_amount = discount.amount_on(subtotal);
    let taxable = subtotal - discount_amount;
    let tax = taxable.scale_bps(tax_rate.bps());

    LineTotals {
        subtotal,
        discount: discount_amount,
        taxable,
        tax,
        total: taxable + tax,
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Field-wise sum across cart lines. Summation is commutative, so no
/// ordering or tie-break rules apply here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub taxable: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartTotals {
    /// Folds one line into the running totals.
    pub fn add_line(&mut self, quantity: i64, line: &LineTotals) {
        self.quantity += quantity;
        self.subtotal += line.subtotal;
        self.discount += line.discount;
        self.taxable += line.taxable;
        self.tax += line.tax;
        self.total += line.total;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(7.5).bps(), 750);
        assert_eq!(TaxRate::from_percentage(0.0).bps(), 0);
        // Negative input collapses to zero rather than wrapping
        assert_eq!(TaxRate::from_percentage(-3.0).bps(), 0);
    }

    #[test]
    fn test_pricing_idempotence() {
        let price = Money::from_cents(1337);
        let discount = DiscountSpec::percentage(12.5);
        let rate = TaxRate::from_bps(825);

        let a = compute_line(price, 7, discount, rate);
        let b = compute_line(price, 7, discount, rate);
        assert_eq!(a, b);
    }

    #[test]
    fn test_percentage_discount_clamped_at_100() {
        // 150% entered: discount equals exactly the subtotal, never more
        let totals = compute_line(
            Money::from_cents(1000),
            2,
            DiscountSpec::percentage(150.0),
            TaxRate::zero(),
        );
        assert_eq!(totals.discount, totals.subtotal);
        assert_eq!(totals.total.cents(), 0);
    }

    #[test]
    fn test_fixed_discount_clamped_at_subtotal() {
        let totals = compute_line(
            Money::from_cents(500),
            1,
            DiscountSpec::Fixed(Money::from_cents(9_999)),
            TaxRate::zero(),
        );
        assert_eq!(totals.discount.cents(), 500);
        assert_eq!(totals.total.cents(), 0);
        assert!(!totals.total.is_negative());
    }

    #[test]
    fn test_end_to_end_reference_line() {
        // 2 × 100.00, fixed 20.00, 10% tax → 198.00
        let totals = compute_line(
            Money::from_cents(10_000),
            2,
            DiscountSpec::Fixed(Money::from_cents(2_000)),
            TaxRate::from_percentage(10.0),
        );
        assert_eq!(totals.subtotal.cents(), 20_000);
        assert_eq!(totals.discount.cents(), 2_000);
        assert_eq!(totals.taxable.cents(), 18_000);
        assert_eq!(totals.tax.cents(), 1_800);
        assert_eq!(totals.total.cents(), 19_800);
    }

    #[test]
    fn test_quantity_change_reapplies_raw_rule() {
        // The stored rule is re-applied to the new subtotal, not the old
        // derived amount.
        let price = Money::from_cents(1000);
        let discount = DiscountSpec::percentage(10.0);
        let rate = TaxRate::zero();

        let one = compute_line(price, 1, discount, rate);
        let three = compute_line(price, 3, discount, rate);

        assert_eq!(one.discount.cents(), 100);
        assert_eq!(three.discount.cents(), 300);
    }

    #[test]
    fn test_cart_totals_sum() {
        let a = compute_line(
            Money::from_cents(1000),
            2,
            DiscountSpec::none(),
            TaxRate::from_bps(1000),
        );
        let b = compute_line(
            Money::from_cents(500),
            1,
            DiscountSpec::Fixed(Money::from_cents(100)),
            TaxRate::from_bps(1000),
        );

        let mut totals = CartTotals::default();
        totals.add_line(2, &a);
        totals.add_line(1, &b);

        assert_eq!(totals.quantity, 3);
        assert_eq!(totals.subtotal, a.subtotal + b.subtotal);
        assert_eq!(totals.discount, a.discount + b.discount);
        assert_eq!(totals.taxable, a.taxable + b.taxable);
        assert_eq!(totals.tax, a.tax + b.tax);
        assert_eq!(totals.total, a.total + b.total);
        assert_eq!(totals.total, totals.taxable + totals.tax);
    }

    #[test]
    fn test_discount_spec_none() {
        assert!(DiscountSpec::none().is_none());
        assert!(!DiscountSpec::percentage(5.0).is_none());
        assert_eq!(
            DiscountSpec::none().amount_on(Money::from_cents(1000)),
            Money::zero()
        );
    }
}
