//! Authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::verify_password;
use crate::web::dto::{LoginRequest, LoginResponse, UserInfo};
use crate::web::error::ApiError;

use super::AppState;

/// POST /api/auth/login - Administrator login.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    if req.username != state.admin_username {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    verify_password(&req.password, &state.admin_password_hash)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    let access_token = state.generate_access_token(&state.admin_username, "admin")?;
    tracing::info!("Administrator logged in");

    Ok(Json(LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            username: state.admin_username.clone(),
            role: "admin".to_string(),
        },
    }))
}
