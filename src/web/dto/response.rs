//! Response DTOs for the web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::submission::UploadRecord;

/// Successful upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The stored submission record.
    #[serde(rename = "uploadInfo")]
    pub upload_info: UploadRecord,
}

/// Deletion outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Whether a submission was removed.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Health probe response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the server answers.
    pub status: String,
    /// Current server time (ISO-8601).
    pub timestamp: String,
    /// Seconds since server start.
    pub uptime: u64,
}

/// Deploy trigger acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeployAck {
    /// Whether the trigger was accepted.
    pub success: bool,
    /// Human-readable outcome of the trigger itself.
    pub message: String,
}

/// Lines of today's deploy log, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct LatestLogsResponse {
    pub logs: Vec<String>,
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// Authenticated user.
    pub user: UserInfo,
}

/// Authenticated user summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
}
