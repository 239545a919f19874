mod health;
mod metrics;
mod quote;
mod submit_order;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use quote::quote_handler;
pub use submit_order::submit_order_handler;
