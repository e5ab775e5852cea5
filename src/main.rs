//! VidTube Backend Server
//!
//! User-account backend: registration, credential-based login, session-token
//! issuance and rotation, logout, and profile updates over PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Json, Router};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use vidtube_server::account::AccountService;
use vidtube_server::auth::{SessionService, TokenIssuer};
use vidtube_server::config::Config;
use vidtube_server::db;
use vidtube_server::routes;
use vidtube_server::state::AppState;
use vidtube_server::store::{postgres::PgCredentialStore, CredentialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    let db_pool = db::create_pool(&config)
        .await
        .context("database connection failed")?;
    db::run_migrations(&db_pool)
        .await
        .context("database migrations failed")?;

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db_pool.clone()));
    let token_issuer = TokenIssuer::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        config.access_token_ttl_seconds,
        config.refresh_token_ttl_days,
    );

    let session_service = Arc::new(SessionService::new(store.clone(), token_issuer));
    let account_service = Arc::new(AccountService::new(store));

    let app_state = AppState::new(session_service, account_service, db_pool);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(routes::auth_routes())
        .merge(routes::account_routes())
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(configure_cors(&config)),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(
    axum::extract::State(pool): axum::extract::State<sqlx::PgPool>,
) -> Json<HealthResponse> {
    let db_status = match db::check_health(&pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
