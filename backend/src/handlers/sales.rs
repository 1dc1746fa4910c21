//! HTTP handlers for point-of-sale transactions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::DateQuery;
use crate::error::{validate_named, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{SaleSummary, SaleTransaction};
use crate::services::sale::{CreateSaleInput, SaleQuery};
use crate::services::SaleService;
use crate::AppState;
use shared::Pagination;

/// Record a sale (any authenticated user)
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SaleTransaction>)> {
    let service = SaleService::new(state.db);
    let mut transaction = service.create_sale(current_user.0.user_id, input).await?;
    transaction.username = Some(current_user.0.username);
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List sale transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SaleQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<SaleTransaction>>> {
    validate_named(page.validate())?;
    let service = SaleService::new(state.db);
    Ok(Json(service.list_transactions(query, page).await?))
}

/// Get one sale transaction
pub async fn get_transaction(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<SaleTransaction>> {
    let service = SaleService::new(state.db);
    Ok(Json(service.get_transaction(transaction_id).await?))
}

/// Daily sales totals
pub async fn daily_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<SaleSummary>> {
    let service = SaleService::new(state.db);
    Ok(Json(service.daily_summary(query.date_or_today()).await?))
}
