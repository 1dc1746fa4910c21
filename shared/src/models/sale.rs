//! Point-of-sale transaction models and the sale planner

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{apply_movement, MovementType, ProductStatus, StockChange};
use crate::error::StockError;
use crate::validation::{validate_price, MAX_AMOUNT};

/// One cart line submitted for sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleLineInput {
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A persisted sale header with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub id: Uuid,
    pub transaction_number: String,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub total_amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleLineItem>,
}

/// A persisted sale line, linked to the movement it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub line_number: i32,
    pub product_sku: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub movement_id: Uuid,
}

/// Aggregate over the sales of one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SaleSummary {
    pub total_transactions: i64,
    pub total_revenue: Decimal,
    pub total_items_sold: i64,
}

/// Locked stock state of a product at the start of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSnapshot {
    pub quantity_in_stock: i32,
    pub status: ProductStatus,
}

/// A sale line with its computed stock change and total
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSaleLine {
    pub line_number: i32,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub change: StockChange,
}

/// Fully validated sale, ready to be written in one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct SalePlan {
    pub lines: Vec<PlannedSaleLine>,
    pub total_amount: Decimal,
}

impl SalePlan {
    /// Quantity each product ends with once every line is applied
    pub fn final_quantities(&self) -> HashMap<&str, i32> {
        self.lines
            .iter()
            .map(|line| (line.sku.as_str(), line.change.new_quantity))
            .collect()
    }

    pub fn items_sold(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

/// `quantity * unit_price`, bounded by what a line total column stores
pub fn line_total(sku: &str, quantity: i32, unit_price: Decimal) -> Result<Decimal, StockError> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or_else(|| StockError::AmountOverflow(sku.to_string()))
}

fn add_amount(sku: &str, total: Decimal, amount: Decimal) -> Result<Decimal, StockError> {
    total
        .checked_add(amount)
        .filter(|sum| *sum <= MAX_AMOUNT)
        .ok_or_else(|| StockError::AmountOverflow(sku.to_string()))
}

pub fn sale_total(lines: &[SaleLineInput]) -> Result<Decimal, StockError> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        let amount = line_total(&line.sku, line.quantity, line.unit_price)?;
        add_amount(&line.sku, total, amount)
    })
}

/// Plan a sale against locked stock levels.
///
/// Lines are applied in input order. Two lines for the same SKU are two
/// sequential decrements, each with its own snapshots. Any failing line fails
/// the whole plan, so a caller that only writes successful plans can never
/// persist a partial sale.
pub fn plan_sale(
    lines: &[SaleLineInput],
    stock: &HashMap<String, StockSnapshot>,
) -> Result<SalePlan, StockError> {
    if lines.is_empty() {
        return Err(StockError::EmptySale);
    }

    let mut running: HashMap<&str, i32> = HashMap::new();
    let mut planned = Vec::with_capacity(lines.len());
    let mut total_amount = Decimal::ZERO;

    for (idx, line) in lines.iter().enumerate() {
        validate_price(line.unit_price).map_err(|reason| StockError::InvalidPrice {
            sku: line.sku.clone(),
            reason,
        })?;

        let snapshot = stock
            .get(&line.sku)
            .ok_or_else(|| StockError::ProductNotFound(line.sku.clone()))?;
        if !snapshot.status.is_active() {
            return Err(StockError::ProductInactive(line.sku.clone()));
        }

        let current = running
            .get(line.sku.as_str())
            .copied()
            .unwrap_or(snapshot.quantity_in_stock);
        let change = apply_movement(&line.sku, current, MovementType::Sale, line.quantity)?;
        running.insert(line.sku.as_str(), change.new_quantity);

        let amount = line_total(&line.sku, line.quantity, line.unit_price)?;
        total_amount = add_amount(&line.sku, total_amount, amount)?;

        planned.push(PlannedSaleLine {
            line_number: (idx + 1) as i32,
            sku: line.sku.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: amount,
            change,
        });
    }

    Ok(SalePlan {
        lines: planned,
        total_amount,
    })
}

/// Distinct SKUs of a cart in ascending order, the order rows are locked in
pub fn lock_order(lines: &[SaleLineInput]) -> Vec<String> {
    let mut skus: Vec<String> = lines.iter().map(|l| l.sku.clone()).collect();
    skus.sort();
    skus.dedup();
    skus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, quantity: i32, price: i64) -> SaleLineInput {
        SaleLineInput {
            sku: sku.to_string(),
            quantity,
            unit_price: Decimal::new(price, 2),
        }
    }

    fn active(quantity: i32) -> StockSnapshot {
        StockSnapshot {
            quantity_in_stock: quantity,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert_eq!(plan_sale(&[], &HashMap::new()), Err(StockError::EmptySale));
    }

    #[test]
    fn lock_order_is_sorted_and_distinct() {
        let lines = vec![line("B", 1, 100), line("A", 1, 100), line("B", 2, 100)];
        assert_eq!(lock_order(&lines), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn repeated_sku_is_applied_cumulatively() {
        let stock = HashMap::from([("A".to_string(), active(5))]);
        let plan = plan_sale(&[line("A", 2, 100), line("A", 3, 100)], &stock).unwrap();
        assert_eq!(plan.lines[0].change.previous_quantity, 5);
        assert_eq!(plan.lines[0].change.new_quantity, 3);
        assert_eq!(plan.lines[1].change.previous_quantity, 3);
        assert_eq!(plan.lines[1].change.new_quantity, 0);
        assert_eq!(plan.final_quantities()["A"], 0);

        let err = plan_sale(&[line("A", 3, 100), line("A", 3, 100)], &stock).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                sku: "A".to_string(),
                available: 2,
                requested: 3
            }
        );
    }

    #[test]
    fn retired_product_cannot_be_sold() {
        let stock = HashMap::from([(
            "A".to_string(),
            StockSnapshot {
                quantity_in_stock: 10,
                status: ProductStatus::Retired,
            },
        )]);
        assert_eq!(
            plan_sale(&[line("A", 1, 100)], &stock),
            Err(StockError::ProductInactive("A".to_string()))
        );
    }

    #[test]
    fn totals_are_exact() {
        let stock = HashMap::from([("A".to_string(), active(10)), ("B".to_string(), active(10))]);
        let plan = plan_sale(&[line("A", 3, 199), line("B", 1, 1050)], &stock).unwrap();
        assert_eq!(plan.total_amount, Decimal::new(1647, 2));
        assert_eq!(plan.items_sold(), 4);
    }

    #[test]
    fn sub_cent_price_is_rejected() {
        let stock = HashMap::from([("A".to_string(), active(10))]);
        let lines = vec![
            SaleLineInput {
                sku: "A".to_string(),
                quantity: 1,
                unit_price: Decimal::new(5, 3),
            };
            2
        ];
        assert!(matches!(
            plan_sale(&lines, &stock),
            Err(StockError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn oversized_line_total_is_an_error() {
        assert_eq!(
            line_total("A", 1_000_000_000, Decimal::from_i128_with_scale(10i128.pow(20), 0)),
            Err(StockError::AmountOverflow("A".to_string()))
        );
        assert_eq!(
            line_total("A", 3, Decimal::new(199, 2)),
            Ok(Decimal::new(597, 2))
        );
    }
}
