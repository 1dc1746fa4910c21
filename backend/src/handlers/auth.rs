//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{AuthToken, LoginInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<AuthToken>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let token = auth_service.login(body).await?;
    Ok(Json(token))
}

/// Current user endpoint handler
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service
        .find_user(current_user.0.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(user))
}
