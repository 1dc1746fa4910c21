//! Sale transaction engine
//!
//! A sale is one database transaction: lock every product the cart touches,
//! plan all lines against the locked quantities, then write the header, one
//! movement per line and the line items. Any failure rolls the whole sale back.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{map_unique_violation, validate_field, AppError, AppResult};
use crate::models::{
    SaleLineInput, SaleLineItem, SaleLineItemRow, SaleSummary, SaleTransaction,
    SaleTransactionRow, StockSnapshot,
};
use crate::services::ledger::{append_movement, lock_products};
use shared::validation::{
    validate_price, validate_quantity, validate_sku, validate_transaction_number,
};
use shared::{lock_order, plan_sale, sale_total, Pagination, ProductStatus, StockError};

/// Sale service for recording and querying point-of-sale transactions
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub transaction_number: String,
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<SaleLineInput>,
}

/// Date filters for listing transactions
#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ProductStateRow {
    sku: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    total_transactions: i64,
    total_revenue: Decimal,
    total_items_sold: i64,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale atomically
    pub async fn create_sale(
        &self,
        user_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleTransaction> {
        validate_field(
            "transaction_number",
            validate_transaction_number(&input.transaction_number),
        )?;
        if input.items.is_empty() {
            return Err(StockError::EmptySale.into());
        }
        for line in &input.items {
            validate_field("sku", validate_sku(&line.sku))?;
            validate_field("quantity", validate_quantity(line.quantity))?;
            validate_field("unit_price", validate_price(line.unit_price))?;
        }
        sale_total(&input.items)?;

        self.precheck_products(&input.items).await?;

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let mut tx = self.db.begin().await?;

        let locked = lock_products(&mut *tx, &lock_order(&input.items)).await?;
        let snapshots: HashMap<String, StockSnapshot> = locked
            .iter()
            .map(|(sku, product)| (sku.clone(), StockSnapshot::from(product)))
            .collect();

        let plan = plan_sale(&input.items, &snapshots).map_err(|err| {
            tracing::warn!(
                transaction_number = %input.transaction_number,
                "Sale rejected: {}",
                err
            );
            AppError::from(err)
        })?;

        let (transaction_id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO sale_transactions (transaction_number, user_id, total_amount, transaction_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(&input.transaction_number)
        .bind(user_id)
        .bind(plan.total_amount)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "sale transaction"))?;

        let reason = format!("Sale {}", input.transaction_number);
        let mut items = Vec::with_capacity(plan.lines.len());

        for line in &plan.lines {
            let (movement_id, _) = append_movement(
                &mut *tx,
                &line.sku,
                &line.change,
                Some(&input.transaction_number),
                Some(&reason),
                Some(user_id),
            )
            .await?;

            let item_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO sale_line_items (
                    transaction_id, line_number, product_sku, quantity, unit_price,
                    line_total, movement_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(transaction_id)
            .bind(line.line_number)
            .bind(&line.sku)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .bind(movement_id)
            .fetch_one(&mut *tx)
            .await?;

            items.push(SaleLineItem {
                id: item_id,
                transaction_id,
                line_number: line.line_number,
                product_sku: line.sku.clone(),
                product_name: locked.get(&line.sku).map(|p| p.name.clone()),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
                movement_id,
            });
        }

        tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction_id,
            transaction_number = %input.transaction_number,
            lines = items.len(),
            total = %plan.total_amount,
            "Sale recorded"
        );

        Ok(SaleTransaction {
            id: transaction_id,
            transaction_number: input.transaction_number,
            user_id,
            username: None,
            total_amount: plan.total_amount,
            transaction_date,
            created_at,
            items,
        })
    }

    /// Optimistic existence and status check before any lock is taken
    async fn precheck_products(&self, lines: &[SaleLineInput]) -> AppResult<()> {
        let skus = lock_order(lines);
        let rows = sqlx::query_as::<_, ProductStateRow>(
            "SELECT sku, status FROM products WHERE sku = ANY($1)",
        )
        .bind(&skus)
        .fetch_all(&self.db)
        .await?;

        let states: HashMap<String, String> =
            rows.into_iter().map(|r| (r.sku, r.status)).collect();

        for sku in skus {
            match states.get(&sku).map(String::as_str) {
                None => return Err(StockError::ProductNotFound(sku).into()),
                Some(status) if status != ProductStatus::Active.as_str() => {
                    return Err(StockError::ProductInactive(sku).into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// List transactions, newest first, each with its items
    pub async fn list_transactions(
        &self,
        query: SaleQuery,
        page: Pagination,
    ) -> AppResult<Vec<SaleTransaction>> {
        let headers = sqlx::query_as::<_, SaleTransactionRow>(
            r#"
            SELECT t.id, t.transaction_number, t.user_id, u.username, t.total_amount,
                   t.transaction_date, t.created_at
            FROM sale_transactions t
            LEFT JOIN users u ON u.id = t.user_id
            WHERE ($1::TIMESTAMPTZ IS NULL OR t.transaction_date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR t.transaction_date <= $2)
            ORDER BY t.transaction_date DESC, t.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.from_date)
        .bind(query.to_date)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut items_by_transaction = self.load_items(&ids).await?;

        Ok(headers
            .into_iter()
            .map(|header| {
                let items = items_by_transaction.remove(&header.id).unwrap_or_default();
                header.with_items(items)
            })
            .collect())
    }

    /// Get one transaction with its items
    pub async fn get_transaction(&self, transaction_id: Uuid) -> AppResult<SaleTransaction> {
        let header = sqlx::query_as::<_, SaleTransactionRow>(
            r#"
            SELECT t.id, t.transaction_number, t.user_id, u.username, t.total_amount,
                   t.transaction_date, t.created_at
            FROM sale_transactions t
            LEFT JOIN users u ON u.id = t.user_id
            WHERE t.id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale transaction".to_string()))?;

        let items = self
            .load_items(&[transaction_id])
            .await?
            .remove(&transaction_id)
            .unwrap_or_default();

        Ok(header.with_items(items))
    }

    async fn load_items(&self, transaction_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<SaleLineItem>>> {
        if transaction_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, SaleLineItemRow>(
            r#"
            SELECT li.id, li.transaction_id, li.line_number, li.product_sku, p.name AS product_name,
                   li.quantity, li.unit_price, li.line_total, li.movement_id
            FROM sale_line_items li
            JOIN products p ON p.sku = li.product_sku
            WHERE li.transaction_id = ANY($1)
            ORDER BY li.transaction_id, li.line_number
            "#,
        )
        .bind(transaction_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SaleLineItem>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.transaction_id)
                .or_default()
                .push(SaleLineItem::from(row));
        }
        Ok(grouped)
    }

    /// Totals for one calendar day (UTC); zeroed when nothing was sold
    pub async fn daily_summary(&self, date: NaiveDate) -> AppResult<SaleSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM sale_transactions t
                 WHERE (t.transaction_date AT TIME ZONE 'UTC')::date = $1) AS total_transactions,
                (SELECT COALESCE(SUM(t.total_amount), 0) FROM sale_transactions t
                 WHERE (t.transaction_date AT TIME ZONE 'UTC')::date = $1) AS total_revenue,
                (SELECT COALESCE(SUM(li.quantity), 0)::BIGINT FROM sale_line_items li
                 JOIN sale_transactions t ON t.id = li.transaction_id
                 WHERE (t.transaction_date AT TIME ZONE 'UTC')::date = $1) AS total_items_sold
            "#,
        )
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        Ok(SaleSummary {
            total_transactions: row.total_transactions,
            total_revenue: row.total_revenue,
            total_items_sold: row.total_items_sold,
        })
    }
}
