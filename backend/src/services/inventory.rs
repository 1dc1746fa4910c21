//! Movement engine: stock receipts, manual adjustments and ledger queries

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{MovementRow, MovementType, MovementTypeInfo, StockLevel, StockMovement};
use crate::services::ledger::{LedgerService, MovementRequest};
use shared::{Pagination, StockError};

/// Inventory service for recording and querying stock movements
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for receiving stock from a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct ReceiveStockInput {
    #[serde(alias = "sku")]
    #[validate(length(min = 1, max = 50, message = "SKU must be 1-50 characters"))]
    pub product_sku: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    #[validate(length(max = 100, message = "Reference must be at most 100 characters"))]
    pub reference_id: Option<String>,
    pub reason: Option<String>,
}

/// Input for a manual adjustment (adjustment, damage or return)
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockInput {
    #[serde(alias = "sku")]
    #[validate(length(min = 1, max = 50, message = "SKU must be 1-50 characters"))]
    pub product_sku: String,
    #[serde(default = "default_adjustment_type")]
    pub movement_type: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub reason: Option<String>,
}

fn default_adjustment_type() -> String {
    MovementType::Adjustment.as_str().to_string()
}

/// Filters for listing movements
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    #[serde(alias = "sku")]
    pub product_sku: Option<String>,
}

/// Result of a receipt or adjustment
#[derive(Debug, Serialize)]
pub struct MovementReceipt {
    pub message: String,
    pub movement_id: Uuid,
    pub previous_quantity: i32,
    pub new_quantity: i32,
}

impl MovementReceipt {
    pub fn new(message: impl Into<String>, movement: &StockMovement) -> Self {
        Self {
            message: message.into(),
            movement_id: movement.id,
            previous_quantity: movement.previous_quantity,
            new_quantity: movement.new_quantity,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovementTypeRow {
    name: String,
    description: String,
    sign: i16,
}

#[derive(Debug, FromRow)]
struct StockLevelRow {
    sku: String,
    name: String,
    quantity_in_stock: i32,
    reorder_threshold: i32,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive stock. The product must exist and be active.
    pub async fn receive_stock(
        &self,
        user_id: Uuid,
        input: ReceiveStockInput,
    ) -> AppResult<StockMovement> {
        LedgerService::new(self.db.clone())
            .record_movement(MovementRequest {
                sku: input.product_sku,
                movement_type: MovementType::Receipt,
                quantity: input.quantity,
                reason: input.reason,
                reference_id: input.reference_id,
                actor: Some(user_id),
                require_active: true,
            })
            .await
    }

    /// Apply a manual adjustment from the allow-list.
    ///
    /// Decreases are checked against current stock before the ledger write,
    /// and again under the row lock by the ledger itself.
    pub async fn adjust_stock(
        &self,
        user_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<StockMovement> {
        let movement_type = MovementType::parse_manual_adjustment(&input.movement_type)?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT quantity_in_stock FROM products WHERE sku = $1",
        )
        .bind(&input.product_sku)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}'", input.product_sku)))?;

        if movement_type.is_decrease() && current < input.quantity {
            tracing::warn!(
                sku = %input.product_sku,
                available = current,
                requested = input.quantity,
                "Adjustment rejected before ledger write"
            );
            return Err(StockError::InsufficientStock {
                sku: input.product_sku,
                available: current,
                requested: input.quantity,
            }
            .into());
        }

        LedgerService::new(self.db.clone())
            .record_movement(MovementRequest {
                sku: input.product_sku,
                movement_type,
                quantity: input.quantity,
                reason: input.reason,
                reference_id: None,
                actor: Some(user_id),
                require_active: false,
            })
            .await
    }

    /// Movement type reference data
    pub async fn list_movement_types(&self) -> AppResult<Vec<MovementTypeInfo>> {
        let rows = sqlx::query_as::<_, MovementTypeRow>(
            "SELECT name, description, sign FROM movement_types ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let name: MovementType = row.name.parse().map_err(|_| {
                    AppError::Internal(format!("Unknown movement type '{}' in store", row.name))
                })?;
                Ok(MovementTypeInfo {
                    name,
                    description: row.description,
                    sign: i32::from(row.sign),
                })
            })
            .collect()
    }

    /// List movements, newest first, optionally for one SKU
    pub async fn list_movements(
        &self,
        query: MovementQuery,
        page: Pagination,
    ) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT m.id, m.product_sku, p.name AS product_name, m.movement_type,
                   m.quantity, m.previous_quantity, m.new_quantity, m.reference_id,
                   m.reason, m.created_by, u.username AS performed_by, m.created_at
            FROM stock_movements m
            JOIN products p ON p.sku = m.product_sku
            LEFT JOIN users u ON u.id = m.created_by
            WHERE ($1::VARCHAR IS NULL OR m.product_sku = $1)
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&query.product_sku)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }

    /// Current stock level of one product
    pub async fn get_stock_level(&self, sku: &str) -> AppResult<StockLevel> {
        let row = sqlx::query_as::<_, StockLevelRow>(
            "SELECT sku, name, quantity_in_stock, reorder_threshold FROM products WHERE sku = $1",
        )
        .bind(sku)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}'", sku)))?;

        Ok(StockLevel::new(
            row.sku,
            row.name,
            row.quantity_in_stock,
            row.reorder_threshold,
        ))
    }
}
