use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use crate::metrics::LIMITER_STORE_ERRORS;
use super::Admission;

const KEY_PREFIX: &str = "ratelimit:";
const STORE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("store rejected command: {0}")]
    Command(String),
    #[error("unexpected store reply: {0}")]
    Reply(String),
}

// Upstash-style REST reply
#[derive(Deserialize)]
struct StoreReply {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

// Fixed-window counter in a shared Redis store, reached over its REST API.
// INCR is atomic on the store, and only the increment that creates the key
// sets its expiry. Any store failure lets the request through.
pub struct CounterLimiter {
    client: reqwest::Client,
    url: String,
    token: String,
    limit: u32,
    window: Duration,
    timeout: Duration,
}

impl CounterLimiter {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        token: impl Into<String>,
        limit: u32,
        window: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            limit,
            window,
            timeout: STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // true = reject
    #[cfg(test)]
    pub async fn is_limited(&self, identifier: &str) -> bool {
        self.check(identifier).await.limited
    }

    pub async fn check(&self, identifier: &str) -> Admission {
        match self.hit(identifier).await {
            Ok(count) => Admission {
                limited: count > u64::from(self.limit),
                remaining: Some(u64::from(self.limit).saturating_sub(count) as u32),
            },
            Err(e) => {
                LIMITER_STORE_ERRORS.inc();
                warn!(identifier, error = %e, "rate limit store unavailable, allowing request");
                Admission { limited: false, remaining: None }
            }
        }
    }

    async fn hit(&self, identifier: &str) -> Result<u64, StoreError> {
        let key = store_key(identifier);
        let reply = self.command(&["INCR", &key]).await?;
        let count = as_count(&reply).ok_or_else(|| StoreError::Reply(reply.to_string()))?;

        if count == 1 {
            let ttl_ms = self.window.as_millis().to_string();
            if let Err(e) = self.command(&["PEXPIRE", &key, &ttl_ms]).await {
                // a counter left without a TTL would never reset
                if let Err(del) = self.command(&["DEL", &key]).await {
                    warn!(identifier, error = %del, "could not drop counter without expiry");
                }
                return Err(e);
            }
        }

        debug!(identifier, count, "rate limit counter incremented");
        Ok(count)
    }

    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(StoreError::Status(res.status()));
        }

        let reply: StoreReply = res.json().await?;
        if let Some(err) = reply.error {
            return Err(StoreError::Command(err));
        }
        Ok(reply.result)
    }
}

fn store_key(identifier: &str) -> String {
    format!("{KEY_PREFIX}{identifier}")
}

// INCR answers with an integer, some proxies stringify it
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_store, mock_store_failing_first_expiry, unreachable_url};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(300);

    fn limiter(url: &str) -> CounterLimiter {
        CounterLimiter::new(reqwest::Client::new(), url, "test-token", 3, WINDOW)
    }

    #[tokio::test]
    async fn fourth_request_is_rejected() {
        let store = mock_store("test-token").await;
        let limiter = limiter(&store.url);

        assert!(!limiter.is_limited("1.2.3.4").await);
        assert!(!limiter.is_limited("1.2.3.4").await);
        assert!(!limiter.is_limited("1.2.3.4").await);
        assert!(limiter.is_limited("1.2.3.4").await);
        assert!(!limiter.is_limited("5.6.7.8").await);
    }

    #[tokio::test]
    async fn expiry_is_set_only_when_counter_is_created() {
        let store = mock_store("test-token").await;
        let limiter = limiter(&store.url);

        for _ in 0..4 {
            limiter.is_limited("ip").await;
        }

        let commands = store.commands();
        let expires: Vec<_> = commands.iter().filter(|c| c[0] == "PEXPIRE").collect();
        assert_eq!(expires.len(), 1);
        assert_eq!(expires[0], &vec!["PEXPIRE".to_string(), "ratelimit:ip".into(), "300000".into()]);
        assert_eq!(commands.iter().filter(|c| c[0] == "INCR").count(), 4);
        // the expiry follows the very first increment
        assert_eq!(commands[0][0], "INCR");
        assert_eq!(commands[1][0], "PEXPIRE");
    }

    #[tokio::test]
    async fn counter_without_expiry_is_dropped() {
        let store = mock_store_failing_first_expiry("test-token").await;
        let limiter = limiter(&store.url);

        // first request fails open and the key is deleted, so counting restarts
        let results: Vec<bool> = [
            limiter.is_limited("ip").await,
            limiter.is_limited("ip").await,
            limiter.is_limited("ip").await,
            limiter.is_limited("ip").await,
            limiter.is_limited("ip").await,
        ]
        .into();
        assert_eq!(results, vec![false, false, false, false, true]);

        let commands = store.commands();
        assert_eq!(commands[2], vec!["DEL".to_string(), "ratelimit:ip".into()]);
        assert_eq!(commands.iter().filter(|c| c[0] == "PEXPIRE").count(), 2);
        assert_eq!(store.counter("ratelimit:ip"), Some(4));
    }

    #[tokio::test]
    async fn check_reports_remaining_from_the_increment() {
        let store = mock_store("test-token").await;
        let limiter = limiter(&store.url);

        assert_eq!(limiter.check("ip").await, Admission { limited: false, remaining: Some(2) });
        limiter.check("ip").await;
        limiter.check("ip").await;
        assert_eq!(limiter.check("ip").await, Admission { limited: true, remaining: Some(0) });
        // one INCR per check and nothing else after the first expiry
        assert!(store.commands().iter().all(|c| c[0] == "INCR" || c[0] == "PEXPIRE"));
    }

    #[tokio::test]
    async fn unreachable_store_fails_open() {
        let limiter = limiter(&unreachable_url().await).with_timeout(Duration::from_millis(500));

        for _ in 0..10 {
            assert!(!limiter.is_limited("ip").await);
        }
        assert_eq!(limiter.check("ip").await.remaining, None);
    }

    #[tokio::test]
    async fn rejected_token_fails_open() {
        let store = mock_store("another-token").await;
        let limiter = limiter(&store.url);

        for _ in 0..5 {
            assert!(!limiter.is_limited("ip").await);
        }
        assert!(store.commands().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_admit_exactly_the_limit() {
        let store = mock_store("test-token").await;
        let limiter = Arc::new(limiter(&store.url));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            tasks.push(tokio::spawn(async move { limiter.is_limited("burst").await }));
        }

        let mut admitted = 0;
        for task in tasks {
            if !task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 3);
    }

    #[test]
    fn counts_parse_from_numbers_and_strings() {
        assert_eq!(as_count(&serde_json::json!(4)), Some(4));
        assert_eq!(as_count(&serde_json::json!("12")), Some(12));
        assert_eq!(as_count(&serde_json::json!(null)), None);
        assert_eq!(as_count(&serde_json::json!("OK")), None);
    }
}
