use axum::{
    extract::{Json, State, rejection::JsonRejection},
    response::Json as ResponseJson,
};
use tracing::{debug, info};

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiInfo, HealthResponse, MAX_ENTITY_NAME_LEN, RateLimitInfo, SearchRequest, SearchResponse,
    SourceCatalog,
};
use crate::sources::{SourceSelector, UnknownSource};

/// Root handler describing the API and its endpoints
pub async fn root() -> ResponseJson<ApiInfo> {
    ResponseJson(ApiInfo::current())
}

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");
    Ok(ResponseJson(HealthResponse::healthy()))
}

pub async fn rate_limit_info(State(state): State<AppState>) -> ResponseJson<RateLimitInfo> {
    ResponseJson(RateLimitInfo::new(state.limiter.max_requests()))
}

pub async fn list_sources() -> ResponseJson<SourceCatalog> {
    ResponseJson(SourceCatalog::all())
}

/// Check the request shape and resolve the selector
fn validate(request: &SearchRequest) -> AppResult<SourceSelector> {
    if !request.is_valid() {
        return Err(AppError::ValidationError(
            "entity_name cannot be empty or only whitespace".to_string(),
        ));
    }
    if request.entity_name.chars().count() > MAX_ENTITY_NAME_LEN {
        return Err(AppError::ValidationError(format!(
            "entity_name cannot be longer than {} characters",
            MAX_ENTITY_NAME_LEN
        )));
    }

    request
        .source_or_default()
        .parse()
        .map_err(|e: UnknownSource| AppError::ValidationError(e.to_string()))
}

/// Search handler: runs the aggregator over the requested sources
pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<ResponseJson<SearchResponse>> {
    let Json(payload) = payload?;
    let selector = validate(&payload)?;
    info!(
        "Search endpoint called for '{}' in {}",
        payload.entity_name,
        payload.source_or_default()
    );

    let response = state
        .aggregator
        .search(&payload.entity_name, selector)
        .await;

    info!("Returning {} hits", response.total_hits);
    Ok(ResponseJson(response))
}
