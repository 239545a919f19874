use crate::rate_limit::RateLimiter;
use crate::webhook::DiscordWebhook;

// app's shared state, built once in main and handed to every handler
pub struct AppState {
    pub limiter: RateLimiter,
    pub webhook: Option<DiscordWebhook>, // None = log orders only
    pub limited_redirect: Option<String>, // notice page for rate-limited clients
}
