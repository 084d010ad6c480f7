//! Administrator handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::submission::StoreStats;
use crate::web::dto::DeleteResponse;
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// Reject bearers without the admin role.
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.0.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator access required"))
    }
}

/// DELETE /api/admin/uploads/:author - Remove a submission.
#[utoipa::path(
    delete,
    path = "/api/admin/uploads/{author}",
    params(
        ("author" = String, Path, description = "Primary author name")
    ),
    responses(
        (status = 200, description = "Deletion outcome", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "No submission for this author"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(author): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    require_admin(&user)?;

    let removed = state.submissions.delete_by_author(&author)?;
    if !removed {
        return Err(ApiError::not_found(format!(
            "submission for {author} not found"
        )));
    }

    tracing::info!(author = %author, admin = %user.0.sub, "Submission deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Submission for {author} deleted"),
    }))
}

/// GET /api/admin/stats - Aggregate store statistics.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Store statistics", body = StoreStats),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<StoreStats>, ApiError> {
    require_admin(&user)?;
    let stats = state.submissions.compute_stats()?;
    Ok(Json(stats))
}
