use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use crate::handlers::{health_handler, metrics_handler, quote_handler, submit_order_handler};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/submit-order", post(submit_order_handler))
        .route("/api/submit-order", post(submit_order_handler))
        .route("/api/quote", post(quote_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
