//! Access log for application routes

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::info;

use super::API_PREFIX;
use crate::prometheus::HTTP_REQUESTS_TOTAL;

/// Log `METHOD PATH STATUS` once the response is ready. Only paths under
/// `/api` are logged; health checks and scrapers hit the system routes.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    if path.starts_with(API_PREFIX) {
        let status = response.status().as_u16();
        info!("{} {} {}", method, path, status);
        counter!(
            HTTP_REQUESTS_TOTAL,
            1,
            "method" => method.to_string(),
            "path" => route,
            "status" => status.to_string()
        );
    }

    response
}
