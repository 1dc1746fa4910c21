//! HTTP handlers for replenishment suggestions (manager/admin only)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{validate_named, AppResult};
use crate::middleware::{require_manager, CurrentUser};
use crate::models::ReplenishmentSuggestion;
use crate::services::replenishment::{
    GenerateInput, GenerationResult, SuggestionActionInput, SuggestionQuery,
};
use crate::services::ReplenishmentService;
use crate::AppState;
use shared::{MessageResponse, Pagination};

/// Run a generation batch. Parameters come from the query string.
pub async fn generate_suggestions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(input): Query<GenerateInput>,
) -> AppResult<(StatusCode, Json<GenerationResult>)> {
    require_manager(&current_user.0)?;
    let service = ReplenishmentService::new(state.db, &state.config.replenishment);
    let result = service.generate(input).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// List suggestions
pub async fn list_suggestions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SuggestionQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<ReplenishmentSuggestion>>> {
    require_manager(&current_user.0)?;
    validate_named(page.validate())?;
    let service = ReplenishmentService::new(state.db, &state.config.replenishment);
    Ok(Json(service.list_suggestions(query, page).await?))
}

/// Accept or ignore a suggestion
pub async fn suggestion_action(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SuggestionActionInput>,
) -> AppResult<Json<MessageResponse>> {
    require_manager(&current_user.0)?;
    let service = ReplenishmentService::new(state.db, &state.config.replenishment);
    let message = service.apply_action(input).await?;
    Ok(Json(MessageResponse::new(message)))
}
