//! Time tracker server
//!
//! Loads configuration, connects to PostgreSQL (falling back to in-memory
//! stores when it is unreachable), seeds an empty database and serves the
//! JSON API.

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::Utc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tt_api::AppState;
use tt_auth::MemorySessionStore;
use tt_core::config::AppConfig;
use tt_db::{Database, Stores};
use tt_services::seed_database;

mod health;

use health::HealthChecker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting time tracker"
    );

    let db = match Database::connect(&config.database).await {
        Ok(db) => {
            db.migrate().await?;
            info!("Connected to database");
            Some(db)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to database, running on in-memory stores");
            None
        }
    };

    let stores = match &db {
        Some(db) => Stores::postgres(db.pool().clone()),
        None => Stores::memory(),
    };

    if config.seed_database && seed_database(&stores, Utc::now().date_naive()).await? {
        info!("Demo accounts are available");
    }

    let addr = config.server_addr();
    let api_state = AppState::new(config, stores, Arc::new(MemorySessionStore::new()));
    let app = build_router(api_state, Arc::new(HealthChecker::new(db.clone())));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,tt_server=debug,tt_api=debug,tt_services=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

fn build_router(api_state: AppState, health: Arc<HealthChecker>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(tt_api::router().with_state(api_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let stores = Stores::memory();
        seed_database(&stores, Utc::now().date_naive()).await.unwrap();
        let state = AppState::new(AppConfig::default(), stores, Arc::new(MemorySessionStore::new()));
        build_router(state, Arc::new(HealthChecker::new(None)))
    }

    async fn status_of(app: Router, request: Request<Body>) -> StatusCode {
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app().await;
        for uri in ["/health", "/health/live", "/health/ready"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            assert_eq!(status_of(app.clone(), request).await, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_api_is_mounted() {
        let app = test_app().await;

        let request = Request::builder().uri("/account/me").body(Body::empty()).unwrap();
        assert_eq!(status_of(app.clone(), request).await, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method("POST")
            .uri("/account/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"admin@test.com","password":"Admin123!"}"#))
            .unwrap();
        assert_eq!(status_of(app, request).await, StatusCode::OK);
    }
}
