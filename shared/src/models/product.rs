//! Product catalog models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a product. Products are retired, never deleted,
/// so that their ledger history stays referentially intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Retired,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Retired => "retired",
        }
    }

    pub fn is_active(self) -> bool {
        self == ProductStatus::Active
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "retired" => Ok(ProductStatus::Retired),
            other => Err(format!("unknown product status: {}", other)),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock position of a product relative to its reorder threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Ok,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Out of stock at zero, low at or below the threshold
    pub fn classify(quantity_in_stock: i32, reorder_threshold: i32) -> Self {
        if quantity_in_stock <= 0 {
            StockStatus::OutOfStock
        } else if quantity_in_stock <= reorder_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::Ok
        }
    }

    /// True for any position at or below the reorder threshold
    pub fn needs_reorder(self) -> bool {
        self != StockStatus::Ok
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Ok => "OK",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub barcode: String,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    /// Derived from the movement ledger; only the ledger writes it
    pub quantity_in_stock: i32,
    pub reorder_threshold: i32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity_in_stock, self.reorder_threshold)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Current stock position for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub sku: String,
    pub name: String,
    pub quantity_in_stock: i32,
    pub reorder_threshold: i32,
    pub status: String,
}

impl StockLevel {
    pub fn new(sku: String, name: String, quantity_in_stock: i32, reorder_threshold: i32) -> Self {
        let status = if StockStatus::classify(quantity_in_stock, reorder_threshold).needs_reorder() {
            "Low Stock"
        } else {
            "OK"
        };
        Self {
            sku,
            name,
            quantity_in_stock,
            reorder_threshold,
            status: status.to_string(),
        }
    }
}

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Product supplier. Names are not unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(StockStatus::classify(0, 5), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(5, 5), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(6, 5), StockStatus::Ok);
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
    }

    #[test]
    fn stock_level_label() {
        assert_eq!(StockLevel::new("A".into(), "a".into(), 5, 5).status, "Low Stock");
        assert_eq!(StockLevel::new("A".into(), "a".into(), 0, 5).status, "Low Stock");
        assert_eq!(StockLevel::new("A".into(), "a".into(), 6, 5).status, "OK");
    }

    #[test]
    fn status_parses() {
        assert_eq!("retired".parse::<ProductStatus>().unwrap(), ProductStatus::Retired);
        assert!("deleted".parse::<ProductStatus>().is_err());
        assert!(ProductStatus::default().is_active());
    }
}
