//! Validation utilities for the Smart Inventory system

use rust_decimal::Decimal;

/// Largest price a `NUMERIC(12, 2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest line or sale total a `NUMERIC(14, 2)` column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate SKU format (1-50 characters, no surrounding whitespace)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() || sku.len() > 50 {
        return Err("SKU must be between 1 and 50 characters");
    }
    if sku.trim() != sku {
        return Err("SKU must not start or end with whitespace");
    }
    Ok(())
}

/// Validate barcode format (1-50 characters)
pub fn validate_barcode(barcode: &str) -> Result<(), &'static str> {
    if barcode.trim().is_empty() || barcode.len() > 50 {
        return Err("Barcode must be between 1 and 50 characters");
    }
    Ok(())
}

/// Validate product name (non-empty, at most 200 characters)
pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Product name must not be empty");
    }
    if name.chars().count() > 200 {
        return Err("Product name must be at most 200 characters");
    }
    Ok(())
}

/// Validate a cost or selling price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price must not be negative");
    }
    if price.normalize().scale() > 2 {
        return Err("Price must have at most two decimal places");
    }
    if price > MAX_PRICE {
        return Err("Price must be at most 9999999999.99");
    }
    Ok(())
}

/// Validate reorder threshold or opening stock
pub fn validate_non_negative(value: i32) -> Result<(), &'static str> {
    if value < 0 {
        return Err("Value must not be negative");
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a movement or sale-line quantity
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a caller-supplied sale transaction number
pub fn validate_transaction_number(number: &str) -> Result<(), &'static str> {
    if number.trim().is_empty() {
        return Err("Transaction number must not be empty");
    }
    if number.len() > 50 {
        return Err("Transaction number must be at most 50 characters");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate username (3-80 characters)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if !(3..=80).contains(&len) {
        return Err("Username must be between 3 and 80 characters");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}
