//! Ledger store: the only code that changes a product's quantity
//!
//! A movement row and the product quantity update are always written in the
//! same transaction, against a product row locked with `FOR UPDATE`.

use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{MovementType, ProductStatus, StockChange, StockMovement, StockSnapshot};
use shared::{apply_movement, StockError};

/// Ledger service for recording single movements
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// A product row held under lock for the rest of the transaction
#[derive(Debug, Clone)]
pub struct LockedProduct {
    pub sku: String,
    pub name: String,
    pub quantity_in_stock: i32,
    pub status: ProductStatus,
}

#[derive(Debug, FromRow)]
struct LockedProductRow {
    sku: String,
    name: String,
    quantity_in_stock: i32,
    status: String,
}

impl TryFrom<LockedProductRow> for LockedProduct {
    type Error = AppError;

    fn try_from(row: LockedProductRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(AppError::Internal)?;
        Ok(LockedProduct {
            sku: row.sku,
            name: row.name,
            quantity_in_stock: row.quantity_in_stock,
            status,
        })
    }
}

impl From<&LockedProduct> for StockSnapshot {
    fn from(product: &LockedProduct) -> Self {
        StockSnapshot {
            quantity_in_stock: product.quantity_in_stock,
            status: product.status,
        }
    }
}

/// Request to record one movement
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub sku: String,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub reference_id: Option<String>,
    pub actor: Option<Uuid>,
    /// Reject the movement when the product is retired
    pub require_active: bool,
}

/// Lock one product row for update
pub async fn lock_product(conn: &mut PgConnection, sku: &str) -> AppResult<Option<LockedProduct>> {
    let row = sqlx::query_as::<_, LockedProductRow>(
        r#"
        SELECT sku, name, quantity_in_stock, status
        FROM products
        WHERE sku = $1
        FOR UPDATE
        "#,
    )
    .bind(sku)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(LockedProduct::try_from).transpose()
}

/// Lock several product rows, one at a time in the order given.
///
/// Callers pass SKUs in ascending order so concurrent multi-product
/// operations acquire their locks in the same sequence.
pub async fn lock_products(
    conn: &mut PgConnection,
    skus: &[String],
) -> AppResult<HashMap<String, LockedProduct>> {
    let mut locked = HashMap::with_capacity(skus.len());
    for sku in skus {
        if let Some(product) = lock_product(conn, sku).await? {
            locked.insert(product.sku.clone(), product);
        }
    }
    Ok(locked)
}

/// Append a movement row and move the product quantity to its new snapshot.
///
/// The product row must already be locked by this transaction.
pub async fn append_movement(
    conn: &mut PgConnection,
    sku: &str,
    change: &StockChange,
    reference_id: Option<&str>,
    reason: Option<&str>,
    actor: Option<Uuid>,
) -> AppResult<(Uuid, chrono::DateTime<chrono::Utc>)> {
    let (movement_id, created_at) = sqlx::query_as::<_, (Uuid, chrono::DateTime<chrono::Utc>)>(
        r#"
        INSERT INTO stock_movements (
            product_sku, movement_type, quantity, previous_quantity, new_quantity,
            reference_id, reason, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, created_at
        "#,
    )
    .bind(sku)
    .bind(change.movement_type.as_str())
    .bind(change.quantity)
    .bind(change.previous_quantity)
    .bind(change.new_quantity)
    .bind(reference_id)
    .bind(reason)
    .bind(actor)
    .fetch_one(&mut *conn)
    .await?;

    let updated = sqlx::query(
        r#"
        UPDATE products
        SET quantity_in_stock = $2, updated_at = NOW()
        WHERE sku = $1 AND quantity_in_stock = $3
        "#,
    )
    .bind(sku)
    .bind(change.new_quantity)
    .bind(change.previous_quantity)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() != 1 {
        return Err(AppError::Internal(format!(
            "Stock of {} changed under a held lock",
            sku
        )));
    }

    Ok((movement_id, created_at))
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record one movement atomically and return the written row.
    ///
    /// Nothing is written when the product is missing, retired (if required
    /// active) or when a decrease would take stock below zero.
    pub async fn record_movement(&self, request: MovementRequest) -> AppResult<StockMovement> {
        let mut tx = self.db.begin().await?;

        let product = lock_product(&mut *tx, &request.sku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}'", request.sku)))?;

        if request.require_active && !product.status.is_active() {
            return Err(StockError::ProductInactive(product.sku).into());
        }

        let change = match apply_movement(
            &product.sku,
            product.quantity_in_stock,
            request.movement_type,
            request.quantity,
        ) {
            Ok(change) => change,
            Err(err) => {
                tracing::warn!(sku = %product.sku, movement_type = %request.movement_type, "Movement rejected: {}", err);
                return Err(err.into());
            }
        };

        let (movement_id, created_at) = append_movement(
            &mut *tx,
            &product.sku,
            &change,
            request.reference_id.as_deref(),
            request.reason.as_deref(),
            request.actor,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            movement_id = %movement_id,
            sku = %product.sku,
            movement_type = %change.movement_type,
            new_quantity = change.new_quantity,
            "Stock movement recorded"
        );

        Ok(StockMovement {
            id: movement_id,
            product_sku: product.sku,
            product_name: Some(product.name),
            movement_type: change.movement_type,
            quantity: change.quantity,
            previous_quantity: change.previous_quantity,
            new_quantity: change.new_quantity,
            reference_id: request.reference_id,
            reason: request.reason,
            created_by: request.actor,
            performed_by: None,
            created_at,
        })
    }
}
