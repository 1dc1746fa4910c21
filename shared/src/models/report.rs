//! Read-only report and dashboard projections

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StockStatus;

/// Product at or below its reorder threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub sku: String,
    pub name: String,
    pub quantity_in_stock: i32,
    pub reorder_threshold: i32,
    pub alert_message: String,
}

impl LowStockAlert {
    pub fn new(sku: String, name: String, quantity_in_stock: i32, reorder_threshold: i32) -> Self {
        let alert_message = low_stock_message(quantity_in_stock, reorder_threshold);
        Self {
            sku,
            name,
            quantity_in_stock,
            reorder_threshold,
            alert_message,
        }
    }
}

pub fn low_stock_message(quantity_in_stock: i32, reorder_threshold: i32) -> String {
    if quantity_in_stock <= 0 {
        format!("Out of stock (reorder threshold {})", reorder_threshold)
    } else {
        format!(
            "Only {} left (reorder threshold {})",
            quantity_in_stock, reorder_threshold
        )
    }
}

/// Sales totals for one calendar date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySalesSummary {
    pub transaction_date: NaiveDate,
    pub transaction_count: i64,
    pub unique_products_sold: i64,
    pub total_items_sold: i64,
    pub total_revenue: Decimal,
}

impl DailySalesSummary {
    /// Zeroed summary for a date without sales
    pub fn empty(transaction_date: NaiveDate) -> Self {
        Self {
            transaction_date,
            transaction_count: 0,
            unique_products_sold: 0,
            total_items_sold: 0,
            total_revenue: Decimal::ZERO,
        }
    }
}

/// One row of the current inventory snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshotItem {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity_in_stock: i32,
    pub reorder_threshold: i32,
    pub selling_price: Decimal,
    pub potential_revenue: Decimal,
    pub is_active: bool,
}

pub fn potential_revenue(selling_price: Decimal, quantity_in_stock: i32) -> Decimal {
    selling_price * Decimal::from(quantity_in_stock)
}

/// Units sold per product over the performance window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub sku: String,
    pub name: String,
    pub category_name: Option<String>,
    pub quantity_in_stock: i32,
    pub total_sold_30d: i64,
    pub avg_daily_sales: Decimal,
    pub status: String,
}

impl ProductPerformance {
    pub fn status_for(quantity_in_stock: i32, reorder_threshold: i32) -> String {
        StockStatus::classify(quantity_in_stock, reorder_threshold)
            .label()
            .to_string()
    }
}

/// Rollup shown on the dashboard landing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_stock_value: Decimal,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub today_sales: DailySalesSummary,
}
