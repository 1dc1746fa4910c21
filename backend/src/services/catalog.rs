//! Catalog service: products, categories and suppliers
//!
//! Products are never deleted. Retiring one keeps its ledger history intact.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_unique_violation, validate_field, AppError, AppResult};
use crate::models::{
    Category, CategoryRow, MovementType, Product, ProductRow, ProductStatus, Supplier,
    SupplierRow,
};
use crate::services::ledger::{append_movement, lock_product};
use shared::validation::{validate_non_negative, validate_price, validate_sku};
use shared::{apply_movement, Pagination};

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for registering a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    pub sku: String,
    #[validate(length(min = 1, max = 50, message = "Barcode must be 1-50 characters"))]
    pub barcode: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    /// Opening stock, recorded as a receipt movement
    #[serde(default)]
    pub quantity_in_stock: i32,
    #[serde(default = "default_reorder_threshold")]
    pub reorder_threshold: i32,
}

fn default_reorder_threshold() -> i32 {
    5
}

/// Partial product update. Quantity is not updatable here.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Barcode must be 1-50 characters"))]
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub reorder_threshold: Option<i32>,
    pub status: Option<ProductStatus>,
}

/// Product listing filters
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    pub category_id: Option<Uuid>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            active_only: true,
            category_id: None,
        }
    }
}

fn default_active_only() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.sku, p.barcode, p.name, p.category_id, c.name AS category_name,
           p.supplier_id, s.name AS supplier_name, p.cost_price, p.selling_price,
           p.quantity_in_stock, p.reorder_threshold, p.status, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN suppliers s ON s.id = p.supplier_id
"#;

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a product, recording any opening stock as a receipt
    pub async fn create_product(
        &self,
        user_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        validate_field("sku", validate_sku(&input.sku))?;
        validate_field("cost_price", validate_price(input.cost_price))?;
        validate_field("selling_price", validate_price(input.selling_price))?;
        validate_field("quantity_in_stock", validate_non_negative(input.quantity_in_stock))?;
        validate_field("reorder_threshold", validate_non_negative(input.reorder_threshold))?;

        if self.sku_exists(&input.sku).await? {
            return Err(AppError::conflict(
                "product",
                "A product with this SKU already exists",
            ));
        }
        if self.barcode_owner(&input.barcode).await?.is_some() {
            return Err(AppError::conflict(
                "product",
                "A product with this barcode already exists",
            ));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                sku, barcode, name, category_id, supplier_id, cost_price, selling_price,
                quantity_in_stock, reorder_threshold, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, 'active')
            "#,
        )
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(&input.name)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_threshold)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        if input.quantity_in_stock > 0 {
            let product = lock_product(&mut *tx, &input.sku)
                .await?
                .ok_or_else(|| AppError::Internal("Product vanished after insert".to_string()))?;
            let change = apply_movement(
                &product.sku,
                product.quantity_in_stock,
                MovementType::Receipt,
                input.quantity_in_stock,
            )?;
            append_movement(
                &mut *tx,
                &product.sku,
                &change,
                None,
                Some("Opening stock"),
                Some(user_id),
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(sku = %input.sku, opening_stock = input.quantity_in_stock, "Product created");

        self.get_product(&input.sku).await
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(sku)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn barcode_owner(&self, barcode: &str) -> AppResult<Option<String>> {
        let owner = sqlx::query_scalar::<_, String>("SELECT sku FROM products WHERE barcode = $1")
            .bind(barcode)
            .fetch_optional(&self.db)
            .await?;
        Ok(owner)
    }

    /// Get a product by SKU, with category and supplier names
    pub async fn get_product(&self, sku: &str) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{} WHERE p.sku = $1", PRODUCT_SELECT))
            .bind(sku)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}'", sku)))?;

        Product::try_from(row)
    }

    /// List products ordered by name
    pub async fn list_products(
        &self,
        query: ProductQuery,
        page: Pagination,
    ) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"{}
            WHERE ($1 = FALSE OR p.status = 'active')
              AND ($2::UUID IS NULL OR p.category_id = $2)
            ORDER BY p.name, p.sku
            LIMIT $3 OFFSET $4
            "#,
            PRODUCT_SELECT
        ))
        .bind(query.active_only)
        .bind(query.category_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Apply a partial update
    pub async fn update_product(&self, sku: &str, input: UpdateProductInput) -> AppResult<Product> {
        input.validate()?;
        if let Some(price) = input.cost_price {
            validate_field("cost_price", validate_price(price))?;
        }
        if let Some(price) = input.selling_price {
            validate_field("selling_price", validate_price(price))?;
        }
        if let Some(threshold) = input.reorder_threshold {
            validate_field("reorder_threshold", validate_non_negative(threshold))?;
        }

        if !self.sku_exists(sku).await? {
            return Err(AppError::NotFound(format!("Product '{}'", sku)));
        }

        if let Some(barcode) = &input.barcode {
            if let Some(owner) = self.barcode_owner(barcode).await? {
                if owner != sku {
                    return Err(AppError::conflict(
                        "product",
                        "Barcode already in use by another product",
                    ));
                }
            }
        }

        sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                barcode = COALESCE($3, barcode),
                category_id = COALESCE($4, category_id),
                supplier_id = COALESCE($5, supplier_id),
                cost_price = COALESCE($6, cost_price),
                selling_price = COALESCE($7, selling_price),
                reorder_threshold = COALESCE($8, reorder_threshold),
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE sku = $1
            "#,
        )
        .bind(sku)
        .bind(&input.name)
        .bind(&input.barcode)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_threshold)
        .bind(input.status.map(|s| s.as_str()))
        .execute(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        self.get_product(sku).await
    }

    /// Retire a product. Its movements and sales stay in place.
    pub async fn retire_product(&self, sku: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET status = 'retired', updated_at = NOW() WHERE sku = $1",
        )
        .bind(sku)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product '{}'", sku)));
        }

        tracing::info!(sku = %sku, "Product retired");
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "category"))?;

        Ok(row.into())
    }

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, contact_person, phone, email, address, created_at
            FROM suppliers
            ORDER BY name, created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    /// Supplier names are not unique
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, contact_person, phone, email, address, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }
}
