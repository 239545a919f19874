mod app;
mod client_id;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod orders;
mod pricing;
mod rate_limit;
mod state;
mod webhook;
#[cfg(test)]
mod test_support;

use clap::Parser; // for cli
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use crate::config::Args;
use crate::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap sees its values
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // parse cli arguments
    let args = Args::parse();
    let client = reqwest::Client::new();

    let limiter = args.build_limiter(client.clone())?;
    let webhook = args.build_webhook(client);
    if webhook.is_none() {
        warn!("DISCORD_WEBHOOK_URL not set, orders will only be logged");
    }
    if matches!(limiter, rate_limit::RateLimiter::Shared(_)) {
        warn!("shared rate limiter fails open: requests are allowed while the store is unreachable");
    }

    info!(
        backend = limiter.backend_name(),
        limit = limiter.limit(),
        window_secs = limiter.window().as_secs(),
        "rate limiter ready"
    );

    // creating shared state
    let state = Arc::new(AppState {
        limiter,
        webhook,
        limited_redirect: args.limited_redirect(),
    });

    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Order gateway running on http://localhost:{}", args.port);
    axum::serve(listener, app).await?;
    Ok(())
}
