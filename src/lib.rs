pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod search;
pub mod sources;

// Re-export key functions for convenience
pub use app::{AppState, build_router, create_app, init_tracing};
