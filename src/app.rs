use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::panic_response;
use crate::rate_limit::RateLimiter;
use crate::routes::create_routes;
use crate::search::Aggregator;

/// State shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub api_token: Arc<str>,
    pub limiter: RateLimiter,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(api_token: impl Into<Arc<str>>, limiter: RateLimiter, aggregator: Aggregator) -> Self {
        Self {
            api_token: api_token.into(),
            limiter,
            aggregator,
        }
    }
}

/// Initialize tracing and logging for the application
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},axum::rejection=info", default_filter).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    info!("Initializing application router");

    let aggregator = Aggregator::with_default_sources(config.request_timeout)?;
    let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
    info!(
        "Sources ready, limiting clients to {} requests per minute",
        config.rate_limit_per_minute
    );

    Ok(build_router(AppState::new(
        config.api_token.as_str(),
        limiter,
        aggregator,
    )))
}

/// Wire the routes and middleware around an already built state
pub fn build_router(state: AppState) -> Router {
    // Permissive CORS: restrict origins before exposing publicly
    Router::new()
        .merge(create_routes(state))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
