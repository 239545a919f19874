use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::IntoResponse,
};
use std::sync::Arc;
use std::time::Instant;
use crate::client_id::client_identifier;
use crate::error::OrderError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::orders;
use crate::state::AppState;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

// Body is taken raw so the rate limiter runs before any parsing
pub async fn submit_order_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, OrderError> {
    REQUEST_TOTAL.inc();

    let identifier = client_identifier(&headers);
    let start_time = Instant::now();

    let result = orders::submit(&state, &identifier, &body).await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    let response = result?;
    let mut headers = HeaderMap::new();
    if let Some(remaining) = response.remaining {
        headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
    }
    Ok((headers, Json(response)))
}
