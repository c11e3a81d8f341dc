//! # ShiftFlow API
//!
//! The API crate provides the web server implementation for the ShiftFlow scheduling
//! service. It defines RESTful endpoints for templates, shifts, assignments and
//! exception requests, plus a websocket route for change notifications.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like actor extraction and error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for actor extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use shiftflow_core::models::closure::BranchClosureGate;
use shiftflow_core::rules::RuleConfig;
use shiftflow_db::repositories::closure::PgClosureGate;
use shiftflow_sync::SyncDispatcher;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Fan-out channels for change notifications
    pub dispatcher: SyncDispatcher,
    /// Labor-law caps, env-overridable
    pub rules: RuleConfig,
    /// Closure calendar consulted by availability and registration
    pub closure_gate: Arc<dyn BranchClosureGate>,
}

/// Builds the full application router. Split out from [`start_server`] so tests can
/// drive the router without binding a socket.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::template::routes())
        .merge(routes::shift::routes())
        .merge(routes::assignment::routes())
        .merge(routes::request::routes())
        .merge(routes::staff::routes())
        .merge(routes::closure::routes())
        .merge(routes::events::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection.
///
/// Initializes logging, assembles shared state, configures routes and middleware,
/// and serves until shutdown.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState {
        closure_gate: Arc::new(PgClosureGate::new(db_pool.clone())),
        dispatcher: SyncDispatcher::new(),
        rules: config.rules.clone(),
        db_pool,
    });

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let mut parsed = Vec::with_capacity(origins.len());
        for origin in origins {
            parsed.push(origin.parse()?);
        }
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
                axum::http::HeaderName::from_static("x-staff-id"),
                axum::http::HeaderName::from_static("x-staff-role"),
            ])
            .allow_origin(parsed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
