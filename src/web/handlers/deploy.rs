//! Deploy trigger, deploy log, and health handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::datetime::now_iso;
use crate::deploy::{verify_signature, LogFile, PushEvent};
use crate::web::dto::{DeployAck, DeployRequest, HealthResponse, LatestLogsResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::admin::require_admin;
use super::AppState;

/// POST /webhook/github - GitHub push webhook.
///
/// Always answers 200 to a verified push so GitHub does not retry; whether a
/// deploy actually started is reported in the body and the deploy log.
#[utoipa::path(
    post,
    path = "/webhook/github",
    responses(
        (status = 200, description = "Webhook accepted", body = DeployAck),
        (status = 401, description = "Signature verification failed"),
    ),
    tag = "deploy"
)]
pub async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DeployAck>, ApiError> {
    if !state.webhook_secret.is_empty() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing webhook signature"))?;
        if !verify_signature(&state.webhook_secret, &body, signature) {
            tracing::warn!("Webhook signature verification failed");
            return Err(ApiError::unauthorized("Invalid webhook signature"));
        }
    }

    let event: PushEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid webhook payload: {e}")))?;

    if !state.deploy_enabled {
        return Ok(Json(DeployAck {
            success: false,
            message: "Deploys are disabled".to_string(),
        }));
    }
    if !event.is_push_to(&state.deploy_branch) {
        tracing::debug!(git_ref = %event.git_ref, "Ignoring push to other ref");
        return Ok(Json(DeployAck {
            success: false,
            message: format!("Ignoring push to {}", event.git_ref),
        }));
    }

    let started = state.deploy.clone().try_trigger(&event.summary());
    Ok(Json(DeployAck {
        success: started,
        message: if started {
            "Deployment started".to_string()
        } else {
            "Deployment already in progress".to_string()
        },
    }))
}

/// POST /api/deploy - Manual deploy trigger.
#[utoipa::path(
    post,
    path = "/api/deploy",
    request_body = DeployRequest,
    responses(
        (status = 200, description = "Deployment started", body = DeployAck),
        (status = 409, description = "Deployment already in progress"),
    ),
    security(("bearer_auth" = [])),
    tag = "deploy"
)]
pub async fn trigger_deploy(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    req: Option<Json<DeployRequest>>,
) -> Result<Json<DeployAck>, ApiError> {
    require_admin(&user)?;

    if !state.deploy_enabled {
        return Err(ApiError::conflict("Deploys are disabled"));
    }

    let reason = req
        .and_then(|Json(r)| r.reason)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "manual trigger".to_string());

    if state
        .deploy
        .clone()
        .try_trigger(&format!("{reason} (by {})", user.0.sub))
    {
        Ok(Json(DeployAck {
            success: true,
            message: "Deployment started".to_string(),
        }))
    } else {
        Err(ApiError::conflict("Deployment already in progress"))
    }
}

/// GET /api/deploy-logs - All deploy log files, newest first.
#[utoipa::path(
    get,
    path = "/api/deploy-logs",
    responses(
        (status = 200, description = "All deploy log files", body = [LogFile]),
    ),
    security(("bearer_auth" = [])),
    tag = "deploy"
)]
pub async fn deploy_logs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<LogFile>>, ApiError> {
    require_admin(&user)?;
    let files = state.deploy.log().read_all()?;
    Ok(Json(files))
}

/// GET /api/deploy-logs/latest - Tail of today's deploy log.
#[utoipa::path(
    get,
    path = "/api/deploy-logs/latest",
    responses(
        (status = 200, description = "Latest deploy log lines", body = LatestLogsResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "deploy"
)]
pub async fn latest_deploy_logs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<LatestLogsResponse>, ApiError> {
    require_admin(&user)?;
    let logs = state.deploy.log().read_latest()?;
    Ok(Json(LatestLogsResponse { logs }))
}

/// GET /health - Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: now_iso(),
            uptime: state.started_at.elapsed().as_secs(),
        }),
    )
}
