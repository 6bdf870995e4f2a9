//! API routes module

pub mod products;

use axum::Router;

use crate::config::Config;

/// Create all API routes
pub fn routes(config: &Config) -> Router {
    Router::new().nest("/products", products::router(config))
}
