//! HTTP request handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Identity};
use crate::store::UserSummary;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Login request.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Exchange a username and password for an access token.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let identity = state
        .authenticator
        .authenticate(&request.username, &request.password)
        .await?;

    let token = state.issuer.issue(&identity)?;
    info!(roles = ?identity.roles(), "Login succeeded");

    Ok(Json(LoginResponse { token }))
}

/// Greet the authenticated user.
pub async fn hello(user: CurrentUser) -> String {
    format!("Hello {}", user.username())
}

/// Identity carried by the presented token.
pub async fn me(user: CurrentUser) -> Json<Identity> {
    Json(user.identity)
}

/// List all users with their roles.
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = state.store.list_users().await?;
    if users.is_empty() {
        return Err(ApiError::not_found("no users"));
    }
    Ok(Json(users))
}

/// Unknown path behind the auth gate. Only reached once the request has
/// passed the middleware for its route group.
pub async fn not_found() -> ApiError {
    ApiError::not_found("no such route")
}
