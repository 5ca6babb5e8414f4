//! # Validation Module
//!
//! Business rule validation, run synchronously before any local mutation or
//! remote write. A validation failure means nothing was applied anywhere.

use crate::error::ValidationError;
use crate::types::Product;
use crate::{Money, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items), negatives are not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates barcode uniqueness against the existing product collection.
///
/// Barcodes are optional; when present they must be unique among products
/// that have one. `editing_id` excludes the product currently being edited
/// so saving it unchanged is not a conflict with itself.
pub fn validate_barcode_unique(
    barcode: Option<&str>,
    products: &[Product],
    editing_id: Option<&str>,
) -> ValidationResult<()> {
    let Some(barcode) = barcode.map(str::trim).filter(|b| !b.is_empty()) else {
        return Ok(());
    };

    let conflict = products.iter().any(|p| {
        p.barcode.as_deref().map(str::trim) == Some(barcode) && Some(p.id.as_str()) != editing_id
    });

    if conflict {
        return Err(ValidationError::Duplicate {
            field: "barcode".to_string(),
            value: barcode.to_string(),
        });
    }

    Ok(())
}

/// Full product validation: name, price, stock, barcode uniqueness.
///
/// Stock may go *negative at runtime* through optimistic sale application,
/// but an admin cannot save a product with negative stock directly.
pub fn validate_product(
    product: &Product,
    products: &[Product],
    editing_id: Option<&str>,
) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_price(product.price)?;

    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    validate_barcode_unique(product.barcode.as_deref(), products, editing_id)
}

// =============================================================================
// Cart / Checkout Validators
// =============================================================================

/// Validates a cart line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the customer fields required at checkout. Name and phone are
/// mandatory; address is optional.
pub fn validate_customer_input(name: &str, phone: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if phone.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Expense Validators
// =============================================================================

/// Validates an expense: title required, amount strictly positive.
pub fn validate_expense(title: &str, amount: Money) -> ValidationResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if amount.is_zero() || amount.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, barcode: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_cents(1000),
            stock: 10,
            image: String::new(),
            category: None,
            barcode: barcode.map(String::from),
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Mint Tea 500g").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_barcode_uniqueness() {
        let products = vec![product("p1", Some("6111")), product("p2", None)];

        // New product with a fresh barcode
        assert!(validate_barcode_unique(Some("7222"), &products, None).is_ok());
        // New product colliding with p1
        assert!(validate_barcode_unique(Some("6111"), &products, None).is_err());
        // p1 re-saving its own barcode is not a conflict
        assert!(validate_barcode_unique(Some("6111"), &products, Some("p1")).is_ok());
        // Absent / empty barcodes never conflict
        assert!(validate_barcode_unique(None, &products, None).is_ok());
        assert!(validate_barcode_unique(Some("  "), &products, None).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_customer_input() {
        assert!(validate_customer_input("Nadia", "0600000000").is_ok());
        assert!(validate_customer_input("", "0600000000").is_err());
        assert!(validate_customer_input("Nadia", " ").is_err());
    }

    #[test]
    fn test_validate_expense() {
        assert!(validate_expense("Rent", Money::from_cents(50_000)).is_ok());
        assert!(validate_expense("", Money::from_cents(50_000)).is_err());
        assert!(validate_expense("Rent", Money::zero()).is_err());
        assert!(validate_expense("Rent", Money::from_cents(-100)).is_err());
    }
}
