// Discord webhook delivery for new commission orders

use serde_json::{Value, json};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};
use crate::metrics::WEBHOOK_LATENCY;
use crate::models::OrderPayload;

const EMBED_COLOR: u32 = 0xE74C3C;
const FOOTER: &str = "GFX Studio - Roblox Commission Invoice";
const DEFAULT_TEXT: &str = "Default settings (no additional charges)";
const MAX_RAW_CHARS: usize = 1900;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook answered with status {0}")]
    Status(reqwest::StatusCode),
}

// Discord webhook client for order notifications
#[derive(Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
    username: String,
    timeout: Duration,
}

impl DiscordWebhook {
    pub fn new(client: reqwest::Client, url: String, username: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            username,
            timeout,
        }
    }

    // Post the order to the channel. One attempt, no retries; a timeout
    // counts as a failed delivery.
    pub async fn send_order(&self, order: &OrderPayload) -> Result<(), NotifyError> {
        let body = order_message(order, &self.username);
        let start = Instant::now();

        let result = self
            .client
            .post(&self.url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await;
        WEBHOOK_LATENCY.observe(start.elapsed().as_secs_f64());

        let response = result.inspect_err(|e| error!(error = %e, "failed to send discord webhook"))?;
        if !response.status().is_success() {
            error!(status = %response.status(), "discord webhook failed");
            return Err(NotifyError::Status(response.status()));
        }

        info!(invoice = %order.invoice_number, "discord order notification sent");
        Ok(())
    }
}

// Full webhook body: raw order dump as content plus the summary embed.
pub fn order_message(order: &OrderPayload, username: &str) -> Value {
    json!({
        "username": username,
        "content": raw_order_content(order),
        "embeds": [order_embed(order)],
    })
}

pub fn order_embed(order: &OrderPayload) -> Value {
    let client = &order.client;
    let gfx = &order.gfx;

    json!({
        "title": "New GFX Commission Order",
        "color": EMBED_COLOR,
        "fields": [
            field("Invoice Number", format!("`{}`", order.invoice_number), true),
            field("Total", format!("`{} robux`", format_robux(order.total.unwrap_or(0))), true),
            field("\u{200b}", "**--- Client Information ---**".to_string(), false),
            field("Roblox Username", client.roblox_username.clone(), true),
            field("Discord Username", client.discord_username.clone(), true),
            field("Email", or_default(&client.email, "Not provided"), true),
            field("\u{200b}", "**--- GFX Specifications ---**".to_string(), false),
            field("Rig Type", gfx.rig_type.clone(), true),
            field("Texture Finish", or_default(&gfx.texture_finish, "Shiny"), true),
            field("Blender Lighting", or_default(&gfx.lighting, DEFAULT_TEXT), false),
            field("Character Positioning / Pose", or_default(&gfx.positioning, DEFAULT_TEXT), false),
            field("Weapons / Tools", or_default(&gfx.weapons, DEFAULT_TEXT), false),
            field("Stages / Podiums", or_default(&gfx.stages, DEFAULT_TEXT), false),
            field("Stroke / Glow / PS Effects", or_default(&gfx.effects, DEFAULT_TEXT), false),
        ],
        "footer": {
            "text": FOOTER
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

fn field(name: &str, value: String, inline: bool) -> Value {
    json!({ "name": name, "value": value, "inline": inline })
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// Pretty JSON of the order in a code fence, capped to fit a Discord message
fn raw_order_content(order: &OrderPayload) -> String {
    let raw = serde_json::to_string_pretty(order).unwrap_or_default();
    format!("\n```json\n{}\n```\n", truncate_raw(&raw))
}

fn truncate_raw(raw: &str) -> String {
    match raw.char_indices().nth(MAX_RAW_CHARS) {
        Some((cut, _)) => format!("{}\n... (truncated)", &raw[..cut]),
        None => raw.to_string(),
    }
}

// Whole Robux with thousands separators, e.g. 1,250
pub fn format_robux(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
