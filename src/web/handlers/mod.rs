//! API handlers for the spacehub web server.

pub mod admin;
pub mod auth;
pub mod deploy;
pub mod upload;

pub use admin::*;
pub use auth::*;
pub use deploy::*;
pub use upload::*;

use std::sync::Arc;
use std::time::Instant;

use jsonwebtoken::{encode, EncodingKey, Header};

use crate::config::Config;
use crate::deploy::DeployRunner;
use crate::submission::SubmissionService;
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submission storage and queries.
    pub submissions: SubmissionService,
    /// Deploy pipeline runner.
    pub deploy: Arc<DeployRunner>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Administrator login name.
    pub admin_username: String,
    /// Argon2 PHC hash of the administrator password.
    pub admin_password_hash: String,
    /// Webhook shared secret (empty disables signature checks).
    pub webhook_secret: String,
    /// Branch whose pushes trigger a deploy.
    pub deploy_branch: String,
    /// Whether the deploy trigger is enabled.
    pub deploy_enabled: bool,
    /// Server start time, for the health probe.
    pub started_at: Instant,
}

impl AppState {
    /// Create application state from configuration and built services.
    pub fn new(config: &Config, submissions: SubmissionService, deploy: Arc<DeployRunner>) -> Self {
        Self {
            submissions,
            deploy,
            encoding_key: EncodingKey::from_secret(config.web.jwt_secret.as_bytes()),
            access_token_expiry: config.web.jwt_access_token_expiry_secs,
            admin_username: config.web.admin_username.clone(),
            admin_password_hash: config.web.admin_password_hash.clone(),
            webhook_secret: config.deploy.webhook_secret.clone(),
            deploy_branch: config.deploy.branch.clone(),
            deploy_enabled: config.deploy.enabled,
            started_at: Instant::now(),
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, username: &str, role: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: username.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}
