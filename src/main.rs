use std::net::SocketAddr;

use risk_lists_svc::app::{create_app, init_tracing};
use risk_lists_svc::config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    info!("Starting Risk Lists Search API...");
    info!("Configuration loaded: {:?}", config);

    // Create the application
    let app = match create_app(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to create app: {:#}", e);
            std::process::exit(1);
        }
    };

    // Create TCP listener
    let listener = match tokio::net::TcpListener::bind(&config.bind_address()).await {
        Ok(listener) => {
            info!("Server running on {}", config.server_url());
            info!("Health check: GET /health");
            info!("Search endpoint: POST /search");
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_address(), e);
            std::process::exit(1);
        }
    };

    // Start the server; peer addresses feed the per-client rate limit
    info!("Server starting...");
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
    } else {
        info!("Server shutdown gracefully");
    }
}
