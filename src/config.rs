//! Configuration module for spacehub.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, SpacehubError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Submission storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for submission directories.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum size of one uploaded file in megabytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
    /// Allowed file extensions (lowercase, without the dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_storage_root() -> String {
    "data/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    100
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["exe".to_string(), "docx".to_string()]
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_file_size_mb: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Deploy trigger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    /// Whether the deploy trigger is enabled.
    #[serde(default = "default_deploy_enabled")]
    pub enabled: bool,
    /// Branch whose pushes trigger a deploy.
    #[serde(default = "default_deploy_branch")]
    pub branch: String,
    /// Working directory for pipeline commands.
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    /// Ordered shell commands run on each deploy.
    #[serde(default = "default_deploy_commands")]
    pub commands: Vec<String>,
    /// Directory for rolling deploy log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Continue with remaining steps after a failed one.
    #[serde(default)]
    pub continue_on_error: bool,
    /// Shared secret for webhook signature verification (empty = unverified).
    #[serde(default)]
    pub webhook_secret: String,
}

fn default_deploy_enabled() -> bool {
    true
}

fn default_deploy_branch() -> String {
    "main".to_string()
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_deploy_commands() -> Vec<String> {
    vec![
        "git pull origin main".to_string(),
        "docker compose up --build -d".to_string(),
    ]
}

fn default_log_dir() -> String {
    "deploy-logs".to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            enabled: default_deploy_enabled(),
            branch: default_deploy_branch(),
            working_dir: default_working_dir(),
            commands: default_deploy_commands(),
            log_dir: default_log_dir(),
            continue_on_error: false,
            webhook_secret: String::new(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
    /// Administrator login name.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Argon2 PHC hash of the administrator password.
    #[serde(default)]
    pub admin_password_hash: String,
}

fn default_jwt_access_expiry() -> u64 {
    900 // 15 minutes
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
            admin_username: default_admin_username(),
            admin_password_hash: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/spacehub.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Submission storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Deploy trigger configuration.
    #[serde(default)]
    pub deploy: DeployConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SpacehubError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SpacehubError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SPACEHUB_JWT_SECRET`: Override the JWT secret key
    /// - `SPACEHUB_WEBHOOK_SECRET`: Override the webhook shared secret
    /// - `SPACEHUB_ADMIN_PASSWORD_HASH`: Override the admin password hash
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("SPACEHUB_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.web.jwt_secret = jwt_secret;
            }
        }
        if let Ok(secret) = std::env::var("SPACEHUB_WEBHOOK_SECRET") {
            if !secret.is_empty() {
                self.deploy.webhook_secret = secret;
            }
        }
        if let Ok(hash) = std::env::var("SPACEHUB_ADMIN_PASSWORD_HASH") {
            if !hash.is_empty() {
                self.web.admin_password_hash = hash;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The JWT secret is not set
    /// - The admin password hash is not set
    /// - The file size limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(SpacehubError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via SPACEHUB_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.web.admin_password_hash.is_empty() {
            return Err(SpacehubError::Config(
                "admin_password_hash is not set. \
                 Set it in config.toml or via SPACEHUB_ADMIN_PASSWORD_HASH environment variable."
                    .to_string(),
            ));
        }
        if self.storage.max_file_size_mb == 0 {
            return Err(SpacehubError::Config(
                "max_file_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
