//! Shift Ledger - staff attendance & scoring service
//!
//! Records one check-in and one check-out per staff member per day, judges
//! them against the staff member's shift with a 5% tolerance band, keeps a
//! monthly-resetting disciplinary score, and closes shifts left open for 12
//! hours whenever they are next read.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum
//! - **Database**: PostgreSQL with sqlx
//! - **Photos**: external HTTP blob store
//! - **Authentication**: bearer token with SHA-256 hashing
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Wire the staff directory, attendance store and photo store
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    state::AppState,
    store::{
        Stores,
        http_blob::HttpBlobStore,
        postgres::{PgAttendanceStore, PgStaffDirectory},
    },
};

/// Four phone photos per check-in
const CHECKIN_BODY_LIMIT: usize = 40 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let stores = Stores {
        staff: Arc::new(PgStaffDirectory::new(pool.clone())),
        attendance: Arc::new(PgAttendanceStore::new(pool.clone())),
        blobs: Arc::new(HttpBlobStore::from_config(&config)?),
    };
    let state = AppState { pool, stores };

    let authenticated_routes = Router::new()
        .route(
            "/api/v1/attendance/check-in",
            post(handlers::attendance::check_in).layer(DefaultBodyLimit::max(CHECKIN_BODY_LIMIT)),
        )
        .route(
            "/api/v1/attendance/check-out",
            post(handlers::attendance::check_out),
        )
        .route("/api/v1/attendance/today", get(handlers::attendance::today))
        .route("/api/v1/attendance", get(handlers::attendance::list))
        .route(
            "/api/v1/attendance/report",
            get(handlers::reports::report),
        )
        .route("/api/v1/staff/me/score", get(handlers::staff::my_score))
        .route(
            "/api/v1/staff/{id}/shift",
            put(handlers::staff::update_shift),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
