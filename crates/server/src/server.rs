//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (request id, logging, timeout, compression, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::middleware::{log_requests, request_id};
use crate::routes::{admin, auth, builds, fetch, health, insights};
use crate::routes::{api_info, not_found};
use crate::state::ServerState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::from_fn;
use axum::routing::{get, patch, post, put};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// CORS for the one configured front-end origin, credentials allowed.
///
/// Methods and headers mirror the preflight request; wildcards are not
/// permitted alongside credentials.
fn cors_layer(config: &ServerConfig) -> ServerResult<CorsLayer> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|e| ServerError::Config(format!("Invalid CORS origin: {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the Axum router with all routes and middleware
///
/// Middleware stack (applied in reverse order):
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging + metrics
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
pub fn build_router(state: Arc<ServerState>) -> ServerResult<Router> {
    let cors = cors_layer(&state.config)?;

    let service_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics));

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/users/create", post(auth::create_user));

    let catalog_routes = Router::new()
        .route("/fetch/{table}", get(fetch::fetch_table))
        .route("/fetch/{table}/{id}", get(fetch::fetch_item))
        .route("/admin/{table}", post(admin::create_item))
        .route(
            "/admin/{table}/{id}",
            put(admin::update_item).delete(admin::delete_item),
        )
        .route(
            "/admin/{table}/{id}/{column}",
            patch(admin::update_attribute),
        );

    let build_routes = Router::new()
        .route("/builds", post(builds::create_build))
        .route("/builds/details/all", get(builds::all_build_details))
        .route("/builds/analytics/high-power", get(insights::high_power_builds))
        .route(
            "/builds/{id}",
            get(builds::build_summary)
                .put(builds::update_build)
                .delete(builds::delete_build),
        )
        .route("/power/{id}", get(builds::estimate_power));

    let query_routes = Router::new()
        .route(
            "/compatibility/{comp1}/{id1}/{comp2}/{id2}",
            get(insights::check_compatibility),
        )
        .route("/parts/counts", get(insights::part_counts))
        .route("/compare/{category}/{ids}", get(insights::compare_parts))
        .route("/search/{category}", get(insights::search_parts))
        .route("/find/{term}", get(insights::find_component))
        .route("/parts/compatible/{category}", post(insights::compatible_parts))
        .route("/psus/compatibility", post(insights::compatible_psus));

    Ok(Router::new()
        .merge(service_routes)
        .merge(auth_routes)
        .merge(catalog_routes)
        .merge(build_routes)
        .merge(query_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the gateway
///
/// Initializes logging and metrics, builds the shared state and router, and
/// serves until SIGTERM or Ctrl+C. The database is not contacted until the
/// first request needs it.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let mut state = ServerState::new(config.clone())?;
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }
    let state = Arc::new(state);
    let store = state.store.clone();

    let app = build_router(state)?;

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting Build-a-PC gateway on {} (database {}@{}:{}/{})",
        addr,
        config.database.user,
        config.database.host,
        config.database.port,
        config.database.name
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "CORS origin: {}, Metrics: {}",
        config.cors_origin,
        config.metrics_enabled
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
