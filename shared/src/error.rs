//! Domain errors raised by the stock ledger rules

use thiserror::Error;

/// Business-rule violations detected while planning stock changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i32,
        requested: i32,
    },

    #[error("Invalid movement type: {0}")]
    InvalidMovementType(String),

    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { sku: String, quantity: i32 },

    #[error("Invalid unit price for {sku}: {reason}")]
    InvalidPrice { sku: String, reason: &'static str },

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Product {0} is inactive")]
    ProductInactive(String),

    #[error("A sale must contain at least one line")]
    EmptySale,

    #[error("Quantity overflow for {0}")]
    QuantityOverflow(String),

    #[error("Amount for {0} exceeds 999999999999.99")]
    AmountOverflow(String),
}

impl StockError {
    /// Field name the error relates to, for validation-style responses
    pub fn field(&self) -> Option<&'static str> {
        match self {
            StockError::InvalidMovementType(_) => Some("movement_type"),
            StockError::InvalidQuantity { .. } | StockError::QuantityOverflow(_) => {
                Some("quantity")
            }
            StockError::InvalidPrice { .. } | StockError::AmountOverflow(_) => Some("unit_price"),
            StockError::EmptySale => Some("items"),
            _ => None,
        }
    }
}
