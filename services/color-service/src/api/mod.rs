//! HTTP surface
//!
//! System routes (`/healthz`, `/metrics`) sit at the root; application
//! routes are nested under `/api` and go through the access log.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod access_log;
mod handlers;

use crate::keys::TimestampKeys;
use crate::prometheus::Metrics;
use crate::store::ColorStore;

/// Prefix for application routes
pub const API_PREFIX: &str = "/api";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ColorStore>,
    pub keys: Arc<TimestampKeys>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn ColorStore>, metrics: Metrics) -> Self {
        Self {
            store,
            keys: Arc::new(TimestampKeys::new()),
            metrics,
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    let system = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::render_metrics));

    let app = Router::new()
        .route("/color", get(handlers::get_color))
        .route("/stats", get(handlers::get_stats));

    Router::new()
        .merge(system)
        .nest(API_PREFIX, app)
        .layer(middleware::from_fn(access_log::access_log))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
