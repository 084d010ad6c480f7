use std::sync::Arc;

use tracing::info;

use spacehub::deploy::DeployRunner;
use spacehub::submission::SubmissionService;
use spacehub::web::WebServer;
use spacehub::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = spacehub::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        spacehub::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    info!("spacehub - coursework submission service");

    let submissions = match SubmissionService::from_config(&config.storage) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Failed to open submission storage: {e}");
            std::process::exit(1);
        }
    };

    let deploy = match DeployRunner::new(&config.deploy) {
        Ok(runner) => Arc::new(runner),
        Err(e) => {
            eprintln!("Failed to set up deploy runner: {e}");
            std::process::exit(1);
        }
    };

    if config.deploy.enabled && config.deploy.webhook_secret.is_empty() {
        tracing::warn!("No webhook secret configured, webhook signatures will not be verified");
    }

    info!(
        "Storage at {}, deploys {}",
        config.storage.root,
        if config.deploy.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let server = match WebServer::new(&config, submissions, deploy) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure web server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
