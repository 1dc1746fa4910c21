//! Authentication middleware
//!
//! Bearer token resolution and role-based access control

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{can_manage_inventory, RoleName, User};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated principal resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<RoleName>,
}

impl AuthUser {
    /// Manager or admin
    pub fn can_manage_inventory(&self) -> bool {
        can_manage_inventory(&self.roles)
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            roles: user.roles,
        }
    }
}

/// Authentication middleware that resolves the bearer token to an active user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    )
    .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.authenticate(token).await?;

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer ...` header value
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Role gate for inventory management operations
pub fn require_manager(user: &AuthUser) -> AppResult<()> {
    if user.can_manage_inventory() {
        Ok(())
    } else {
        tracing::warn!(username = %user.username, "Manager role required");
        Err(AppError::Forbidden("Not enough permissions".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[RoleName]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "tester".to_string(),
            roles: roles.to_vec(),
        }
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn manager_gate() {
        assert!(require_manager(&user(&[RoleName::Manager])).is_ok());
        assert!(require_manager(&user(&[RoleName::Admin])).is_ok());
        assert!(require_manager(&user(&[RoleName::Clerk, RoleName::Admin])).is_ok());
        assert!(matches!(
            require_manager(&user(&[RoleName::Clerk])),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_manager(&user(&[])).is_err());
    }
}
