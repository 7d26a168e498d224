use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use shelfwatch_alerting::AlertMailer;
use shelfwatch_utils::{format_validation_errors, init_logging, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use validator::Validate;

mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;

use handlers::{health_check, index_page, metrics_handler};
use metrics::AppMetrics;
use middleware::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!("Starting Shelfwatch web service");

    if let Err(errors) = config.scanner.validate() {
        anyhow::bail!("Invalid scanner configuration: {}", format_validation_errors(&errors));
    }
    if let Err(errors) = config.email.validate() {
        warn!("Email settings are incomplete: {}", format_validation_errors(&errors));
    }

    let mailer = AlertMailer::from_config(&config.email);
    let app = create_app(&config, mailer)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Shelfwatch listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(config: &AppConfig, mailer: AlertMailer) -> Result<Router> {
    let metrics = AppMetrics::new(&config.monitoring.prometheus_namespace)
        .context("Failed to register metrics")?;

    let app = Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout_seconds)))
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(AppState {
            config: Arc::new(config.clone()),
            mailer,
            metrics: Arc::new(metrics),
        });

    Ok(app)
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub mailer: AlertMailer,
    pub metrics: Arc<AppMetrics>,
}
