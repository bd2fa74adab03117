use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::SourceKind;

pub const API_VERSION: &str = "1.0.0";

/// Longest entity name accepted by the search endpoint, in characters
pub const MAX_ENTITY_NAME_LEN: usize = 200;

/// One matched record from one source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    pub name: String,
    pub source: String,
    pub jurisdiction: Option<String>,
    pub address: Option<String>,
    pub entity_type: Option<String>,
    pub linked_to: Option<String>,
    pub data_from: Option<String>,
    pub country: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub grounds: Option<String>,
    pub programs: Option<String>,
    pub list_name: Option<String>,
    pub score: Option<String>,
    pub url: Option<String>,
}

impl EntityResult {
    /// Starts a record for `kind` with only the mandatory fields filled in
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            source: kind.label().to_string(),
            ..Default::default()
        }
    }
}

/// Request payload for the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub entity_name: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl SearchRequest {
    /// Validates if the name is not empty or just whitespace
    pub fn is_valid(&self) -> bool {
        !self.entity_name.trim().is_empty()
    }

    pub fn source_or_default(&self) -> &str {
        self.source.as_deref().unwrap_or("all")
    }
}

/// Response payload for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub entity_name: String,
    pub total_hits: usize,
    pub search_time: f64,
    pub sources_searched: Vec<String>,
    pub results: Vec<EntityResult>,
    pub timestamp: DateTime<Utc>,
}

impl SearchResponse {
    pub fn new(
        entity_name: String,
        search_time: f64,
        sources_searched: Vec<String>,
        results: Vec<EntityResult>,
    ) -> Self {
        Self {
            entity_name,
            total_hits: results.len(),
            search_time,
            sources_searched,
            results,
            timestamp: Utc::now(),
        }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            version: API_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub search: String,
    pub health: String,
    pub sources: String,
    pub rate_limit_info: String,
}

/// Response payload for the root endpoint
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Endpoints,
}

impl ApiInfo {
    pub fn current() -> Self {
        Self {
            message: "Risk Lists Search API".to_string(),
            version: API_VERSION.to_string(),
            status: "active".to_string(),
            timestamp: Utc::now(),
            endpoints: Endpoints {
                search: "/search".to_string(),
                health: "/health".to_string(),
                sources: "/sources".to_string(),
                rate_limit_info: "/rate-limit-info".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RateLimitInfo {
    pub max_requests_per_minute: u32,
    pub description: String,
}

impl RateLimitInfo {
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            description: format!(
                "At most {} requests per minute per client IP",
                max_requests_per_minute
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub description: &'static str,
    pub attributes: &'static [&'static str],
}

impl From<SourceKind> for SourceDescriptor {
    fn from(kind: SourceKind) -> Self {
        Self {
            id: kind.id(),
            name: kind.label(),
            url: kind.url(),
            description: kind.description(),
            attributes: kind.attributes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceCatalog {
    pub sources: Vec<SourceDescriptor>,
}

impl SourceCatalog {
    pub fn all() -> Self {
        Self {
            sources: SourceKind::ALL.into_iter().map(SourceDescriptor::from).collect(),
        }
    }
}
