use axum::{Router, middleware, routing::get, routing::post};

use crate::app::AppState;
use crate::auth::require_token;
use crate::handlers::{health_check, list_sources, rate_limit_info, root, search_handler};
use crate::rate_limit::rate_limit;

/// Creates and configures all application routes
pub fn create_routes(state: AppState) -> Router {
    // Layers run outermost-last: token check first, then the rate limit
    let protected = Router::new()
        .route("/search", post(search_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/rate-limit-info", get(rate_limit_info))
        .route("/sources", get(list_sources))
        .merge(protected)
        .with_state(state)
}
