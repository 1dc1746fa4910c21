//! Database row types for the Smart Inventory server
//!
//! Re-exports models from the shared crate and adds the rows they are read
//! from. Enumerations are stored as text and parsed on the way out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;

use crate::error::AppError;

fn parse_column<T>(value: &str, column: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
{
    value
        .parse()
        .map_err(|_| AppError::Internal(format!("Unexpected {} value '{}'", column, value)))
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub sku: String,
    pub barcode: String,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub quantity_in_stock: i32,
    pub reorder_threshold: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            status: parse_column(&row.status, "product status")?,
            sku: row.sku,
            barcode: row.barcode,
            name: row.name,
            category_id: row.category_id,
            category_name: row.category_name,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            quantity_in_stock: row.quantity_in_stock,
            reorder_threshold: row.reorder_threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MovementRow {
    pub id: Uuid,
    pub product_sku: String,
    pub product_name: Option<String>,
    pub movement_type: String,
    pub quantity: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reference_id: Option<String>,
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub performed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(StockMovement {
            movement_type: parse_column(&row.movement_type, "movement type")?,
            id: row.id,
            product_sku: row.product_sku,
            product_name: row.product_name,
            quantity: row.quantity,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            reference_id: row.reference_id,
            reason: row.reason,
            created_by: row.created_by,
            performed_by: row.performed_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SaleTransactionRow {
    pub id: Uuid,
    pub transaction_number: String,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub total_amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SaleTransactionRow {
    pub fn with_items(self, items: Vec<SaleLineItem>) -> SaleTransaction {
        SaleTransaction {
            id: self.id,
            transaction_number: self.transaction_number,
            user_id: self.user_id,
            username: self.username,
            total_amount: self.total_amount,
            transaction_date: self.transaction_date,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SaleLineItemRow {
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

impl From<SaleLineItemRow> for SaleLineItem {
    fn from(row: SaleLineItemRow) -> Self {
        SaleLineItem {
            id: row.id,
            transaction_id: row.transaction_id,
            line_number: row.line_number,
            product_sku: row.product_sku,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
            movement_id: row.movement_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SuggestionRow {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub product_sku: String,
    pub product_name: Option<String>,
    pub product_barcode: Option<String>,
    pub forecasted_demand: i32,
    pub current_stock: i32,
    pub suggested_quantity: i32,
    pub date_generated: DateTime<Utc>,
    pub is_acted_upon: bool,
    pub acted_upon_at: Option<DateTime<Utc>>,
}

impl From<SuggestionRow> for ReplenishmentSuggestion {
    fn from(row: SuggestionRow) -> Self {
        ReplenishmentSuggestion {
            id: row.id,
            batch_id: row.batch_id,
            product_sku: row.product_sku,
            product_name: row.product_name,
            product_barcode: row.product_barcode,
            forecasted_demand: row.forecasted_demand,
            current_stock: row.current_stock,
            suggested_quantity: row.suggested_quantity,
            date_generated: row.date_generated,
            is_acted_upon: row.is_acted_upon,
            acted_upon_at: row.acted_upon_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SupplierRow {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_text_is_an_internal_error() {
        let result: Result<MovementType, _> = parse_column("transfer", "movement type");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn retired_status_is_read_back() {
        let status: ProductStatus = parse_column("retired", "product status").unwrap();
        assert_eq!(status, ProductStatus::Retired);
    }
}
