//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    delete_upload, deploy_logs, download, file_info, github_webhook, health, latest_deploy_logs,
    list_uploads, login, stats, trigger_deploy, upload, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Extra room for multipart framing and text fields on top of the two files.
const BODY_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    // Student-facing routes plus the admin-checked deploy endpoints
    let public_routes = Router::new()
        .route("/upload", post(upload))
        .route("/uploads", get(list_uploads))
        .route("/download/:author/:filename", get(download))
        .route("/file-info/:author/:filename", get(file_info))
        .route("/auth/login", post(login))
        .route("/deploy", post(trigger_deploy))
        .route("/deploy-logs", get(deploy_logs))
        .route("/deploy-logs/latest", get(latest_deploy_logs));

    // Administrator routes (token checked in the handlers)
    let admin_routes = Router::new()
        .route("/uploads/:author", delete(delete_upload))
        .route("/stats", get(stats));

    let api_routes = Router::new()
        .merge(public_routes)
        .nest("/admin", admin_routes);

    // The body cap covers both files at the per-file limit plus form overhead
    let body_limit = app_state.submissions.max_file_size() * 2 + BODY_OVERHEAD_BYTES;

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .route("/webhook/github", post(github_webhook))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit as usize))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// OpenAPI document for the whole API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "spacehub API",
        description = "Coursework submission sharing service"
    ),
    paths(
        crate::web::handlers::upload::upload,
        crate::web::handlers::upload::list_uploads,
        crate::web::handlers::upload::download,
        crate::web::handlers::upload::file_info,
        crate::web::handlers::auth::login,
        crate::web::handlers::admin::delete_upload,
        crate::web::handlers::admin::stats,
        crate::web::handlers::deploy::github_webhook,
        crate::web::handlers::deploy::trigger_deploy,
        crate::web::handlers::deploy::deploy_logs,
        crate::web::handlers::deploy::latest_deploy_logs,
        crate::web::handlers::deploy::health,
    ),
    components(schemas(
        crate::submission::UploadRecord,
        crate::submission::FileSet,
        crate::submission::FileInfo,
        crate::submission::StoreStats,
        crate::deploy::LogFile,
        crate::web::dto::request::LoginRequest,
        crate::web::dto::request::DeployRequest,
        crate::web::dto::response::UploadResponse,
        crate::web::dto::response::DeleteResponse,
        crate::web::dto::response::HealthResponse,
        crate::web::dto::response::DeployAck,
        crate::web::dto::response::LatestLogsResponse,
        crate::web::dto::response::LoginResponse,
        crate::web::dto::response::UserInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "uploads", description = "Submission upload and download"),
        (name = "auth", description = "Administrator authentication"),
        (name = "admin", description = "Administrator operations"),
        (name = "deploy", description = "Deploy trigger and logs"),
        (name = "health", description = "Liveness probe"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
