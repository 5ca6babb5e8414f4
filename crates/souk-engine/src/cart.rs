//! # Cart
//!
//! In-memory order under construction. Each line freezes a stock snapshot
//! at add time; quantity edits are validated against that snapshot, not
//! live stock, so concurrent sales elsewhere cannot invalidate an open cart
//! mid-edit. The final word on stock is the checkout application.
//!
//! Adding the same product twice deliberately creates two lines: discounts
//! and tax are per line, and a cashier may want one unit at list price and
//! three at a negotiated discount.

use souk_core::{
    compute_line, CartTotals, CoreError, CoreResult, DiscountSpec, LineTotals, Money, Product,
    TaxRate, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};
use uuid::Uuid;

// =============================================================================
// Cart Line
// =============================================================================

/// One order line. Pricing inputs are copied from the product at add time so
/// a later product edit never silently reprices an open cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    /// Stock at the moment the line was added. Quantity edits validate
    /// against this, not live stock.
    pub stock_snapshot: i64,
    pub quantity: i64,
    pub discount: DiscountSpec,
    pub tax_rate: TaxRate,
    pub totals: LineTotals,
}

impl CartLine {
    fn reprice(&mut self) {
        self.totals = compute_line(self.unit_price, self.quantity, self.discount, self.tax_rate);
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The order being assembled. Lines keep insertion order; checkout consumes
/// them in that order.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Adds a product as a new line. The requested quantity is clamped into
    /// `[1, stock]`; an out-of-stock product is rejected outright.
    ///
    /// The line's tax rate comes from the caller (the store-wide setting at
    /// add time) and its discount starts empty.
    pub fn add_line(
        &mut self,
        product: &Product,
        quantity: i64,
        tax_rate: TaxRate,
    ) -> CoreResult<&CartLine> {
        if !product.in_stock() {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }
        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let quantity = quantity.clamp(1, product.stock.min(MAX_ITEM_QUANTITY));
        let mut line = CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            stock_snapshot: product.stock,
            quantity,
            discount: DiscountSpec::none(),
            tax_rate,
            totals: LineTotals::default(),
        };
        line.reprice();
        self.lines.push(line);
        Ok(self.lines.last().expect("line was just pushed"))
    }

    fn line_mut(&mut self, line_id: &str) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }

    /// Sets a line's quantity. Rejects zero/negative and anything beyond the
    /// line's stock snapshot.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self.line_mut(line_id)?;
        if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::Validation(
                souk_core::ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_ITEM_QUANTITY.min(line.stock_snapshot),
                },
            ));
        }
        if quantity > line.stock_snapshot {
            return Err(CoreError::InsufficientStock {
                name: line.name.clone(),
                available: line.stock_snapshot,
                requested: quantity,
            });
        }
        line.quantity = quantity;
        line.reprice();
        Ok(())
    }

    /// Replaces a line's discount. The raw rule is stored and re-applied on
    /// every reprice, so a later quantity change recomputes the discount
    /// from the new subtotal.
    pub fn set_discount(&mut self, line_id: &str, discount: DiscountSpec) -> CoreResult<()> {
        let line = self.line_mut(line_id)?;
        line.discount = discount;
        line.reprice();
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(line_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Aggregate totals across all lines.
    pub fn totals(&self) -> CartTotals {
        let mut totals = CartTotals::default();
        for line in &self.lines {
            totals.add_line(line.quantity, &line.totals);
        }
        totals
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
