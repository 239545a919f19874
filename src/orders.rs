use rand::Rng;
use tracing::{debug, error, info, warn};
use crate::error::OrderError;
use crate::metrics::{ORDERS_INVALID, ORDERS_SUBMITTED, RATE_LIMITED, WEBHOOK_FAILURES};
use crate::models::{OrderPayload, SubmitResponse};
use crate::pricing::{RigType, compute_total};
use crate::state::AppState;
use crate::webhook;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// One order submission from `identifier`. The limiter runs before the body
// is parsed, so invalid orders still spend a slot.
pub async fn submit(state: &AppState, identifier: &str, body: &[u8]) -> Result<SubmitResponse, OrderError> {
    let admission = state.limiter.check(identifier).await;
    if admission.limited {
        RATE_LIMITED.inc();
        warn!(identifier, "order submission rate limited");
        return Err(OrderError::RateLimited {
            redirect: state.limited_redirect.clone(),
        });
    }

    let mut order = parse_order(body).inspect_err(|_| ORDERS_INVALID.inc())?;
    validate(&order).inspect_err(|_| ORDERS_INVALID.inc())?;

    let quote = compute_total(&order.gfx);
    if let Some(claimed) = order.total.filter(|claimed| *claimed != quote.total) {
        warn!(identifier, claimed, computed = quote.total, "client total differs, using computed total");
    }
    order.total = Some(quote.total);

    if order.invoice_number.trim().is_empty() {
        order.invoice_number = generate_invoice_number();
    }

    match &state.webhook {
        Some(hook) => {
            if let Err(e) = hook.send_order(&order).await {
                WEBHOOK_FAILURES.inc();
                error!(invoice = %order.invoice_number, error = %e, "order notification failed");
                return Err(e.into());
            }
        }
        None => {
            let embed = webhook::order_embed(&order);
            info!(invoice = %order.invoice_number, embed = %embed, "order received (no webhook configured)");
        }
    }

    ORDERS_SUBMITTED.inc();
    info!(invoice = %order.invoice_number, total = quote.total, identifier, "order submitted");

    Ok(SubmitResponse {
        success: true,
        message: "Order submitted successfully.".to_string(),
        invoice_number: order.invoice_number,
        remaining: admission.remaining,
    })
}

fn parse_order(body: &[u8]) -> Result<OrderPayload, OrderError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "unparseable order body");
        OrderError::Validation("Invalid order payload.".to_string())
    })
}

pub fn validate(order: &OrderPayload) -> Result<(), OrderError> {
    let client = &order.client;
    if client.roblox_username.trim().is_empty() || client.discord_username.trim().is_empty() {
        return Err(OrderError::Validation(
            "Roblox Username and Discord Username are required.".to_string(),
        ));
    }

    if order.gfx.rig_type.trim().is_empty() {
        return Err(OrderError::Validation("Rig type selection is required.".to_string()));
    }
    if order.gfx.rig_type.parse::<RigType>().is_err() {
        return Err(OrderError::Validation("Rig type must be R6 or R15.".to_string()));
    }

    Ok(())
}

// GFX-<millis base36>-<4 random base36>, same shape the order form uses
pub fn generate_invoice_number() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("GFX-{}-{}", to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
