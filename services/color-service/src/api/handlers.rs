use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::AppState;
use crate::color::{Color, ColorTally};
use crate::prometheus::COLORS_PICKED_TOTAL;

#[derive(Debug, Serialize, Deserialize)]
pub struct ColorResponse {
    pub color: Color,
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Pick a random color and store it under a fresh timestamp key.
///
/// A failed write is logged and answered with `null`.
pub async fn get_color(State(state): State<AppState>) -> Json<Option<ColorResponse>> {
    let color = Color::random();
    let key = state.keys.next();

    if let Err(e) = state.store.set_key(&key, color.as_str()).await {
        error!(error = %e, key = %key, "Failed to set key in Redis");
        return Json(None);
    }

    counter!(COLORS_PICKED_TOTAL, 1, "color" => color.as_str());
    Json(Some(ColorResponse { color }))
}

/// Tally every stored color.
///
/// A failed read is logged and answered with `{}`.
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let values = match state.store.values().await {
        Ok(values) => values,
        Err(e) => {
            error!(error = %e, "Failed to retrieve colors from Redis");
            return Json(serde_json::json!({})).into_response();
        }
    };

    Json(ColorTally::from_values(&values)).into_response()
}
