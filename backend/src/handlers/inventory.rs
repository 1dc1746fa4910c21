//! HTTP handlers for inventory movement endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::error::{validate_named, AppResult};
use crate::middleware::{require_manager, CurrentUser};
use crate::models::{MovementTypeInfo, StockLevel, StockMovement};
use crate::services::inventory::{
    AdjustStockInput, MovementQuery, MovementReceipt, ReceiveStockInput,
};
use crate::services::InventoryService;
use crate::AppState;
use shared::Pagination;

/// List movement types
pub async fn list_movement_types(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<MovementTypeInfo>>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.list_movement_types().await?))
}

/// List stock movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<MovementQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<StockMovement>>> {
    validate_named(page.validate())?;
    let service = InventoryService::new(state.db);
    let movements = service.list_movements(query, page).await?;
    Ok(Json(movements))
}

/// Current stock level for a product
pub async fn get_stock_level(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<Json<StockLevel>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.get_stock_level(&sku).await?))
}

/// Receive stock (manager/admin)
pub async fn receive_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReceiveStockInput>,
) -> AppResult<(StatusCode, Json<MovementReceipt>)> {
    require_manager(&current_user.0)?;
    input.validate()?;
    let service = InventoryService::new(state.db);
    let movement = service.receive_stock(current_user.0.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MovementReceipt::new("Stock received successfully", &movement)),
    ))
}

/// Manual adjustment (manager/admin)
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<(StatusCode, Json<MovementReceipt>)> {
    require_manager(&current_user.0)?;
    input.validate()?;
    let service = InventoryService::new(state.db);
    let movement = service.adjust_stock(current_user.0.user_id, input).await?;
    let message = format!("Stock {} recorded successfully", movement.movement_type);
    Ok((
        StatusCode::CREATED,
        Json(MovementReceipt::new(message, &movement)),
    ))
}
