//! Portfolio API - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod seed;

use axum::{
    http::{header, Method},
    middleware, Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use config::ServerConfig;
use error::StartupError;
use routes::AppState;

/// CORS restricted to the configured frontend origins.
pub fn configure_cors(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.origin_headers())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// All `/api` resource routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(routes::projects::routes())
        .merge(routes::blog::routes())
        .merge(routes::shop::routes())
        .merge(routes::contact::routes())
        .merge(routes::analytics::routes())
}

/// Create and configure the application router.
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(routes::health::routes())
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .layer(configure_cors(config))
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::default();

    // Dropping the guards stops the background log writers.
    let _log_guards = logging::init(config.is_production());

    routes::health::init_start_time();

    let pool = db::init_pool(None).await?;
    db::run_migrations(&pool).await?;

    let app = create_app(AppState::new(pool.clone()), &config);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
