use axum::Json;
use crate::models::GfxDetails;
use crate::pricing::{Quote, compute_total};

// Price breakdown for the invoice summary, no side effects
pub async fn quote_handler(Json(gfx): Json<GfxDetails>) -> Json<Quote> {
    Json(compute_total(&gfx))
}
