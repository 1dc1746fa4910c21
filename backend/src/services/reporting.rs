//! Reporting service for dashboard projections and data export
//!
//! Everything here is read-only and runs at the default isolation level.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{
    potential_revenue, DailySalesSummary, DashboardSummary, InventorySnapshotItem, LowStockAlert,
    ProductPerformance,
};
use shared::average_daily_sales;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Inventory snapshot filter
#[derive(Debug, Deserialize)]
pub struct SnapshotFilter {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

impl Default for SnapshotFilter {
    fn default() -> Self {
        Self { active_only: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, FromRow)]
struct LowStockRow {
    sku: String,
    name: String,
    quantity_in_stock: i32,
    reorder_threshold: i32,
}

#[derive(Debug, FromRow)]
struct DailySalesRow {
    transaction_count: i64,
    unique_products_sold: i64,
    total_items_sold: i64,
    total_revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    sku: String,
    name: String,
    category: Option<String>,
    quantity_in_stock: i32,
    reorder_threshold: i32,
    selling_price: Decimal,
    status: String,
}

#[derive(Debug, FromRow)]
struct PerformanceRow {
    sku: String,
    name: String,
    category_name: Option<String>,
    quantity_in_stock: i32,
    reorder_threshold: i32,
    total_sold: i64,
}

#[derive(Debug, FromRow)]
struct StockTotalsRow {
    total_products: i64,
    total_stock_value: Decimal,
    low_stock_count: i64,
    out_of_stock_count: i64,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active products at or below their reorder threshold, emptiest first
    pub async fn low_stock(&self) -> AppResult<Vec<LowStockAlert>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT sku, name, quantity_in_stock, reorder_threshold
            FROM products
            WHERE status = 'active' AND quantity_in_stock <= reorder_threshold
            ORDER BY quantity_in_stock ASC, sku ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LowStockAlert::new(r.sku, r.name, r.quantity_in_stock, r.reorder_threshold))
            .collect())
    }

    /// Sales totals for one calendar date (UTC)
    pub async fn daily_sales(&self, date: NaiveDate) -> AppResult<DailySalesSummary> {
        let row = sqlx::query_as::<_, DailySalesRow>(
            r#"
            WITH day_sales AS (
                SELECT id, total_amount
                FROM sale_transactions
                WHERE (transaction_date AT TIME ZONE 'UTC')::date = $1
            )
            SELECT
                (SELECT COUNT(*) FROM day_sales) AS transaction_count,
                (SELECT COUNT(DISTINCT li.product_sku) FROM sale_line_items li
                 JOIN day_sales d ON d.id = li.transaction_id) AS unique_products_sold,
                (SELECT COALESCE(SUM(li.quantity), 0)::BIGINT FROM sale_line_items li
                 JOIN day_sales d ON d.id = li.transaction_id) AS total_items_sold,
                (SELECT COALESCE(SUM(total_amount), 0) FROM day_sales) AS total_revenue
            "#,
        )
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        if row.transaction_count == 0 {
            return Ok(DailySalesSummary::empty(date));
        }

        Ok(DailySalesSummary {
            transaction_date: date,
            transaction_count: row.transaction_count,
            unique_products_sold: row.unique_products_sold,
            total_items_sold: row.total_items_sold,
            total_revenue: row.total_revenue,
        })
    }

    /// Current inventory with potential revenue per product
    pub async fn inventory_snapshot(
        &self,
        filter: &SnapshotFilter,
    ) -> AppResult<Vec<InventorySnapshotItem>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT p.sku, p.name, c.name AS category, p.quantity_in_stock,
                   p.reorder_threshold, p.selling_price, p.status
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE ($1 = FALSE OR p.status = 'active')
            ORDER BY p.name, p.sku
            "#,
        )
        .bind(filter.active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| InventorySnapshotItem {
                potential_revenue: potential_revenue(r.selling_price, r.quantity_in_stock),
                is_active: r.status == "active",
                sku: r.sku,
                name: r.name,
                category: r.category,
                quantity_in_stock: r.quantity_in_stock,
                reorder_threshold: r.reorder_threshold,
                selling_price: r.selling_price,
            })
            .collect())
    }

    /// Active products ranked by units sold over the trailing window
    pub async fn product_performance(&self, window_days: i32) -> AppResult<Vec<ProductPerformance>> {
        let rows = sqlx::query_as::<_, PerformanceRow>(
            r#"
            SELECT p.sku, p.name, c.name AS category_name, p.quantity_in_stock,
                   p.reorder_threshold, COALESCE(SUM(m.quantity), 0)::BIGINT AS total_sold
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN stock_movements m
                   ON m.product_sku = p.sku
                  AND m.movement_type = 'sale'
                  AND m.created_at >= NOW() - make_interval(days => $1)
            WHERE p.status = 'active'
            GROUP BY p.sku, p.name, c.name, p.quantity_in_stock, p.reorder_threshold
            ORDER BY total_sold DESC, p.sku ASC
            "#,
        )
        .bind(window_days)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductPerformance {
                status: ProductPerformance::status_for(r.quantity_in_stock, r.reorder_threshold),
                avg_daily_sales: average_daily_sales(r.total_sold, window_days).round_dp(2),
                sku: r.sku,
                name: r.name,
                category_name: r.category_name,
                quantity_in_stock: r.quantity_in_stock,
                total_sold_30d: r.total_sold,
            })
            .collect())
    }

    /// Dashboard rollup over active products plus today's sales
    pub async fn summary(&self, today: NaiveDate) -> AppResult<DashboardSummary> {
        let totals = sqlx::query_as::<_, StockTotalsRow>(
            r#"
            SELECT
                COUNT(*) AS total_products,
                COALESCE(SUM(cost_price * quantity_in_stock), 0) AS total_stock_value,
                COUNT(*) FILTER (WHERE quantity_in_stock <= reorder_threshold) AS low_stock_count,
                COUNT(*) FILTER (WHERE quantity_in_stock = 0) AS out_of_stock_count
            FROM products
            WHERE status = 'active'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let today_sales = self.daily_sales(today).await?;

        Ok(DashboardSummary {
            total_products: totals.total_products,
            total_stock_value: totals.total_stock_value,
            low_stock_count: totals.low_stock_count,
            out_of_stock_count: totals.out_of_stock_count,
            today_sales,
        })
    }

    /// Export report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_rows_export_with_header() {
        let rows = vec![
            LowStockAlert::new("WID-1".into(), "Widget".into(), 0, 5),
            LowStockAlert::new("GAD-2".into(), "Gadget".into(), 3, 5),
        ];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("sku,name,quantity_in_stock,reorder_threshold,alert_message")
        );
        assert_eq!(
            lines.next(),
            Some("WID-1,Widget,0,5,Out of stock (reorder threshold 5)")
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn empty_export_is_empty() {
        let rows: Vec<LowStockAlert> = Vec::new();
        assert_eq!(ReportingService::export_to_csv(&rows).unwrap(), "");
    }
}
