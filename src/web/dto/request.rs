//! Request DTOs for the web API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Administrator login name.
    pub username: String,
    /// Administrator password.
    pub password: String,
}

/// Manual deploy trigger request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeployRequest {
    /// Free-form reason recorded in the deploy log.
    #[serde(default)]
    pub reason: Option<String>,
}
