use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gfx_order_requests_total", "Total number of order submissions received").unwrap();
    pub static ref ORDERS_SUBMITTED: Counter =
        register_counter!("gfx_orders_submitted_total", "Orders accepted and relayed").unwrap();
    pub static ref ORDERS_INVALID: Counter =
        register_counter!("gfx_orders_invalid_total", "Orders rejected by validation").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("gfx_orders_rate_limited_total", "Submissions rejected by the rate limiter").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "gfx_order_request_latency_seconds",
        "Submission latency in seconds"
    )
    .unwrap();
    pub static ref WEBHOOK_FAILURES: Counter =
        register_counter!("gfx_webhook_failures_total", "Failed order notification deliveries").unwrap();
    pub static ref WEBHOOK_LATENCY: Histogram = register_histogram!(
        "gfx_webhook_latency_seconds",
        "Order notification round trip in seconds"
    )
    .unwrap();
    pub static ref LIMITER_STORE_ERRORS: Counter =
        register_counter!("gfx_limiter_store_errors_total", "Rate limit store failures (request allowed)").unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("gfx_limiter_tracked_clients", "Identifiers held by the in-process rate limiter").unwrap();
}
