use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;
use crate::webhook::NotifyError;

// Outcomes that stop an order from going through
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    // redirect: optional static notice page instead of a 429
    #[error("Too many requests. Please try again later.")]
    RateLimited { redirect: Option<String> },

    #[error("Failed to send order notification.")]
    Delivery(#[from] NotifyError),
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = match &self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::RateLimited { redirect: Some(url) } => {
                return Redirect::temporary(url).into_response();
            }
            OrderError::RateLimited { redirect: None } => StatusCode::TOO_MANY_REQUESTS,
            // cause is logged where it happens, the client gets the generic message
            OrderError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
