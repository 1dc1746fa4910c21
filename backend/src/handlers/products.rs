//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{validate_named, AppResult};
use crate::middleware::{require_manager, CurrentUser};
use crate::models::{Category, Product, Supplier};
use crate::services::catalog::{
    CreateCategoryInput, CreateProductInput, CreateSupplierInput, ProductQuery,
    UpdateProductInput,
};
use crate::services::CatalogService;
use crate::AppState;
use shared::Pagination;

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Product>>> {
    validate_named(page.validate())?;
    let service = CatalogService::new(state.db);
    let products = service.list_products(query, page).await?;
    Ok(Json(products))
}

/// Register a product (manager/admin)
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    require_manager(&current_user.0)?;
    let service = CatalogService::new(state.db);
    let product = service.create_product(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by SKU
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.get_product(&sku).await?;
    Ok(Json(product))
}

/// Update a product (manager/admin)
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sku): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    require_manager(&current_user.0)?;
    let service = CatalogService::new(state.db);
    let product = service.update_product(&sku, input).await?;
    Ok(Json(product))
}

/// Retire a product (manager/admin)
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<StatusCode> {
    require_manager(&current_user.0)?;
    let service = CatalogService::new(state.db);
    service.retire_product(&sku).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_manager(&current_user.0)?;
    let service = CatalogService::new(state.db);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.list_suppliers().await?))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    require_manager(&current_user.0)?;
    let service = CatalogService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}
