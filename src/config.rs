use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;
use crate::rate_limit::{CounterLimiter, RateLimiter, SlidingWindowLimiter};
use crate::webhook::DiscordWebhook;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "gfx-order-gateway")]
#[command(about = "Order intake for GFX commissions, relayed to a Discord channel")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Discord webhook receiving orders; unset = log orders only
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    // Name the webhook posts under
    #[arg(long, env = "DISCORD_WEBHOOK_USERNAME", default_value = "GFX Studio")]
    pub webhook_username: String,

    // Webhook delivery timeout in seconds
    #[arg(long, env = "WEBHOOK_TIMEOUT", default_value_t = 10)]
    pub webhook_timeout: u64,

    // Rate limit max submissions per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 3)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value_t = 300)]
    pub rate_window: u64,

    // Where rate limit state lives
    #[arg(long, value_enum, env = "RATE_LIMIT_BACKEND", default_value_t = LimiterBackend::Memory)]
    pub limiter: LimiterBackend,

    // Tracked identifiers before the in-process limiter prunes stale ones
    #[arg(long, env = "RATE_LIMIT_SWEEP_THRESHOLD", default_value_t = 10_000)]
    pub sweep_threshold: usize,

    // Shared store REST url (shared backend only)
    #[arg(long, env = "RATE_LIMIT_STORE_URL")]
    pub store_url: Option<String>,

    // Shared store access token (shared backend only)
    #[arg(long, env = "RATE_LIMIT_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    // Shared store request timeout in milliseconds
    #[arg(long, env = "RATE_LIMIT_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,

    // Send rate-limited clients here (307) instead of answering 429
    #[arg(long, env = "RATE_LIMITED_REDIRECT")]
    pub limited_redirect: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterBackend {
    /// Sliding window log kept in this process
    Memory,
    /// Fixed-window counter in a shared Redis REST store
    Shared,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shared rate limiter needs --store-url and --store-token")]
    MissingStore,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn build_limiter(&self, client: reqwest::Client) -> Result<RateLimiter, ConfigError> {
        match self.limiter {
            LimiterBackend::Memory => Ok(RateLimiter::Memory(
                SlidingWindowLimiter::new(self.rate_limit, self.rate_window())
                    .with_sweep_threshold(self.sweep_threshold),
            )),
            LimiterBackend::Shared => {
                let (Some(url), Some(token)) = (non_empty(&self.store_url), non_empty(&self.store_token)) else {
                    return Err(ConfigError::MissingStore);
                };
                Ok(RateLimiter::Shared(
                    CounterLimiter::new(client, url, token, self.rate_limit, self.rate_window())
                        .with_timeout(Duration::from_millis(self.store_timeout_ms)),
                ))
            }
        }
    }

    pub fn build_webhook(&self, client: reqwest::Client) -> Option<DiscordWebhook> {
        non_empty(&self.webhook_url).map(|url| {
            DiscordWebhook::new(
                client,
                url.to_string(),
                self.webhook_username.clone(),
                Duration::from_secs(self.webhook_timeout),
            )
        })
    }

    pub fn limited_redirect(&self) -> Option<String> {
        non_empty(&self.limited_redirect).map(str::to_string)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
