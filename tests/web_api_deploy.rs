//! Web API Deploy Tests
//!
//! Integration tests for the webhook, manual deploy trigger, deploy logs,
//! and health endpoints.

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use spacehub::config::Config;
use spacehub::deploy::{webhook, DeployRunner};
use spacehub::submission::SubmissionService;
use spacehub::web::handlers::AppState;
use spacehub::web::middleware::JwtState;
use spacehub::web::router::create_router;

const ADMIN_PASSWORD: &str = "test-admin-password";
const WEBHOOK_SECRET: &str = "test-webhook-secret";

fn create_test_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.storage.root = root.join("uploads").to_string_lossy().into_owned();
    config.deploy.working_dir = root.to_string_lossy().into_owned();
    config.deploy.commands = vec!["echo deploy-ok".to_string()];
    config.deploy.log_dir = root.join("deploy-logs").to_string_lossy().into_owned();
    config.deploy.webhook_secret = WEBHOOK_SECRET.to_string();
    config.web.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.web.admin_password_hash =
        spacehub::hash_password(ADMIN_PASSWORD).expect("Failed to hash test password");
    config
}

fn create_test_server_with(
    adjust: impl FnOnce(&mut Config),
) -> (TestServer, Arc<DeployRunner>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(tmp.path());
    adjust(&mut config);

    let submissions =
        SubmissionService::from_config(&config.storage).expect("Failed to open storage");
    let deploy =
        Arc::new(DeployRunner::new(&config.deploy).expect("Failed to create deploy runner"));

    let app_state = Arc::new(AppState::new(&config, submissions, deploy.clone()));
    let jwt_state = Arc::new(JwtState::new(&config.web.jwt_secret));
    let router = create_router(app_state, jwt_state, &config.web.cors_origins);

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, deploy, tmp)
}

fn create_test_server() -> (TestServer, Arc<DeployRunner>, TempDir) {
    create_test_server_with(|_| {})
}

async fn admin_token(server: &TestServer) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn wait_idle(deploy: &Arc<DeployRunner>) {
    for _ in 0..200 {
        if !deploy.is_active() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("deploy did not finish in time");
}

fn push_payload(git_ref: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "ref": git_ref,
        "head_commit": { "message": "Update coursework site" },
        "pusher": { "name": "octocat" },
    }))
    .unwrap()
}

// ============================================================================
// Webhook Tests
// ============================================================================

#[tokio::test]
async fn test_webhook_starts_deploy() {
    let (server, deploy, _tmp) = create_test_server();

    let body = push_payload("refs/heads/main");
    let signature = webhook::sign(WEBHOOK_SECRET, &body);

    let response = server
        .post("/webhook/github")
        .add_header("x-hub-signature-256", signature)
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_ok();
    let ack = response.json::<Value>();
    assert_eq!(ack["success"], true);
    assert_eq!(ack["message"], "Deployment started");

    wait_idle(&deploy).await;
    let lines = deploy.log().read_latest().unwrap().join("\n");
    assert!(lines.contains("deploy-ok"));
    assert!(lines.contains("octocat"));
    assert!(lines.contains("Deployment finished successfully"));
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let (server, deploy, _tmp) = create_test_server();

    let body = push_payload("refs/heads/main");
    let response = server
        .post("/webhook/github")
        .add_header("x-hub-signature-256", "sha256=deadbeef")
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_unauthorized();
    assert!(!deploy.is_active());
}

#[tokio::test]
async fn test_webhook_rejects_missing_signature() {
    let (server, _deploy, _tmp) = create_test_server();

    let body = push_payload("refs/heads/main");
    let response = server
        .post("/webhook/github")
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_webhook_ignores_other_branch() {
    let (server, deploy, _tmp) = create_test_server();

    let body = push_payload("refs/heads/feature-x");
    let signature = webhook::sign(WEBHOOK_SECRET, &body);

    let response = server
        .post("/webhook/github")
        .add_header("x-hub-signature-256", signature)
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_ok();

    let message = response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("Ignoring"));
    assert!(!deploy.is_active());
}

#[tokio::test]
async fn test_webhook_without_secret_skips_verification() {
    let (server, deploy, _tmp) = create_test_server_with(|config| {
        config.deploy.webhook_secret = String::new();
    });

    let body = push_payload("refs/heads/main");
    let response = server
        .post("/webhook/github")
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Deployment started");
    wait_idle(&deploy).await;
}

#[tokio::test]
async fn test_webhook_when_deploys_disabled() {
    let (server, deploy, _tmp) = create_test_server_with(|config| {
        config.deploy.enabled = false;
    });

    let body = push_payload("refs/heads/main");
    let signature = webhook::sign(WEBHOOK_SECRET, &body);

    let response = server
        .post("/webhook/github")
        .add_header("x-hub-signature-256", signature)
        .add_header("content-type", "application/json")
        .bytes(body.into())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Deploys are disabled");
    assert!(!deploy.is_active());
}

// ============================================================================
// Manual Trigger Tests
// ============================================================================

#[tokio::test]
async fn test_manual_deploy_requires_token() {
    let (server, _deploy, _tmp) = create_test_server();

    let response = server.post("/api/deploy").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_manual_deploy() {
    let (server, deploy, _tmp) = create_test_server();
    let token = admin_token(&server).await;

    let response = server
        .post("/api/deploy")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .json(&json!({ "reason": "fresh build wanted" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Deployment started");

    wait_idle(&deploy).await;
    let lines = deploy.log().read_latest().unwrap().join("\n");
    assert!(lines.contains("fresh build wanted"));
    assert!(lines.contains("admin"));
}

#[tokio::test]
async fn test_manual_deploy_conflict_while_running() {
    let (server, deploy, _tmp) = create_test_server_with(|config| {
        config.deploy.commands = vec!["sleep 0.5".to_string()];
    });
    let token = admin_token(&server).await;

    server
        .post("/api/deploy")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await
        .assert_status_ok();

    let second = server
        .post("/api/deploy")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await;
    second.assert_status(axum::http::StatusCode::CONFLICT);

    wait_idle(&deploy).await;
}

// ============================================================================
// Deploy Log Tests
// ============================================================================

#[tokio::test]
async fn test_deploy_logs_require_token() {
    let (server, _deploy, _tmp) = create_test_server();

    server
        .get("/api/deploy-logs")
        .await
        .assert_status_unauthorized();
    server
        .get("/api/deploy-logs/latest")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_deploy_logs_after_run() {
    let (server, deploy, _tmp) = create_test_server();
    let token = admin_token(&server).await;

    server
        .post("/api/deploy")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await
        .assert_status_ok();
    wait_idle(&deploy).await;

    let latest = server
        .get("/api/deploy-logs/latest")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await;
    latest.assert_status_ok();
    let logs = latest.json::<Value>()["logs"].as_array().unwrap().clone();
    assert!(!logs.is_empty());
    // Newest first
    assert!(logs[0]
        .as_str()
        .unwrap()
        .contains("Deployment finished successfully"));

    let all = server
        .get("/api/deploy-logs")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await;
    all.assert_status_ok();
    let files = all.json::<Vec<Value>>();
    assert_eq!(files.len(), 1);
    assert!(files[0]["filename"]
        .as_str()
        .unwrap()
        .starts_with("deploy-"));
}

#[tokio::test]
async fn test_deploy_logs_empty_without_runs() {
    let (server, _deploy, _tmp) = create_test_server();
    let token = admin_token(&server).await;

    let latest = server
        .get("/api/deploy-logs/latest")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await;
    latest.assert_status_ok();
    assert!(latest.json::<Value>()["logs"].as_array().unwrap().is_empty());
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _deploy, _tmp) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
    assert!(body["uptime"].is_u64());
}
