//! ScholarNet API Gateway
//!
//! The HTTP entry point for the co-authorship explorer.
//! Handles:
//! - Co-authorship graph and shortest-path requests
//! - Author search passthrough
//! - Static front-end hosting
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use anyhow::Context;
use axum::{middleware as axum_middleware, routing::get, Router};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use scholarnet_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics::{self, TRAVERSAL_BUCKETS},
    provider::create_provider,
    VERSION,
};
use scholarnet_traversal::NetworkService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<NetworkService>,
    pub metrics: Option<PrometheusHandle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting ScholarNet API Gateway v{}", VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let metrics_handle = if config.observability.metrics_enabled {
        Some(install_metrics_recorder()?)
    } else {
        None
    };

    // Initialize bibliographic provider
    let provider = create_provider(&config.provider)?;
    info!(
        provider = provider.name(),
        base_url = %config.provider.base_url,
        timeout_secs = config.provider.timeout_secs,
        "Provider initialized"
    );

    let service = NetworkService::new(provider, config.traversal.clone());

    // Create app state
    let state = AppState {
        config: config.clone(),
        service: Arc::new(service),
        metrics: metrics_handle,
    };

    // Build the router
    let app = create_router(state)?;

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Install the Prometheus recorder and keep its histograms drained
fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            TRAVERSAL_BUCKETS,
        )?
        .install_recorder()?;

    metrics::register_metrics();

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(handle)
}

/// Create the main application router
fn create_router(state: AppState) -> anyhow::Result<Router> {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        .route("/search_authors", get(handlers::network::search_authors))
        .route("/graph", get(handlers::network::graph))
        .route("/shortest_path", get(handlers::network::shortest_path));

    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        )?;
        api_routes = api_routes.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit_middleware,
        ));
    }

    // Compose the app
    let app = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        // Static front-end
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(axum_middleware::from_fn(middleware::metrics::track_requests))
        .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state);

    Ok(app)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
