mod auth;
mod config;
mod db;

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    AuthResponse, AuthService, CredentialsRequest, ErrorBody, PasswordHasher, PgAccountStore,
    SessionResponse, TokenService, UserView,
};
use config::Config;
use db::ConnectionManager;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::signin_handler,
        auth::handlers::me_handler,
    ),
    components(
        schemas(CredentialsRequest, AuthResponse, SessionResponse, UserView, ErrorBody)
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "Account signup, signin and session lookup")
    ),
    info(
        title = "OpenPrompts Auth API",
        version = "1.0.0",
        description = "Username/password accounts and bearer-token sessions for OpenPrompts"
    )
)]
struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
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

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    auth: Arc<AuthService>,
    connections: Arc<ConnectionManager>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Handler for GET /health
/// Reports pool state without issuing a query
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = if state.connections.is_connected() {
        "connected"
    } else {
        "pending"
    };
    Json(json!({ "status": "ok", "database": database }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "NOT_FOUND".to_string(),
            message: "No such route".to_string(),
        }),
    )
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/signin", post(auth::signin_handler))
        .route("/me", get(auth::me_handler))
}

/// Creates and configures the application router
/// Auth routes are served under both `/auth` and `/api/auth`
fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/api/auth", auth_routes())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("OpenPrompts auth - Starting...");

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    match config.token_ttl {
        Some(ttl) => tracing::info!("Session tokens expire after {:?}", ttl),
        None => tracing::warn!("Session tokens are issued without expiry"),
    }

    let connections = Arc::new(ConnectionManager::new(
        config.database_url.clone(),
        config.pool.clone(),
    ));
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)?;
    let store = PgAccountStore::new(connections.clone());
    let service = Arc::new(AuthService::new(Arc::new(store), PasswordHasher::new(), tokens));

    // Connect in the background; handlers retry if this attempt fails
    let warmup = connections.clone();
    tokio::spawn(async move {
        match warmup.ensure_connected().await {
            Ok(_) => tracing::info!("Database ready"),
            Err(e) => tracing::warn!("Database not reachable yet: {}", e),
        }
    });

    let app = create_router(AppState {
        auth: service,
        connections,
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("OpenPrompts auth is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
