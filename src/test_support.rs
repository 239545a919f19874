// In-process stand-ins for the Discord webhook and the shared limiter store

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// Address nothing listens on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub struct MockWebhook {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockWebhook {
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

// Records every posted body and answers with `status`
pub async fn mock_webhook(status: StatusCode) -> MockWebhook {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let app = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(body);
                status
            }
        }),
    );

    MockWebhook {
        url: spawn(app).await,
        received,
    }
}

pub async fn slow_webhook(delay: Duration) -> String {
    let app = Router::new().route(
        "/",
        post(move || async move {
            tokio::time::sleep(delay).await;
            StatusCode::NO_CONTENT
        }),
    );
    spawn(app).await
}

#[derive(Default)]
struct StoreData {
    counters: HashMap<String, i64>,
    commands: Vec<Vec<String>>,
    fail_next_expiry: bool,
}

#[derive(Clone)]
struct StoreState {
    token: String,
    data: Arc<Mutex<StoreData>>,
}

pub struct MockStore {
    pub url: String,
    data: Arc<Mutex<StoreData>>,
}

impl MockStore {
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.data.lock().unwrap().commands.clone()
    }

    pub fn counter(&self, key: &str) -> Option<i64> {
        self.data.lock().unwrap().counters.get(key).copied()
    }
}

// Redis REST endpoint understanding INCR, PEXPIRE and DEL. Each command
// runs under one lock so INCR is atomic like the real store.
pub async fn mock_store(token: &str) -> MockStore {
    store_with(token, StoreData::default()).await
}

// Same store, but the first PEXPIRE it sees answers with an error
pub async fn mock_store_failing_first_expiry(token: &str) -> MockStore {
    store_with(
        token,
        StoreData {
            fail_next_expiry: true,
            ..StoreData::default()
        },
    )
    .await
}

async fn store_with(token: &str, initial: StoreData) -> MockStore {
    let data = Arc::new(Mutex::new(initial));
    let state = StoreState {
        token: token.to_string(),
        data: Arc::clone(&data),
    };
    let app = Router::new().route("/", post(store_command)).with_state(state);

    MockStore {
        url: spawn(app).await,
        data,
    }
}

async fn store_command(
    State(state): State<StoreState>,
    headers: HeaderMap,
    Json(cmd): Json<Vec<String>>,
) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {}", state.token);
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
    }

    let mut data = state.data.lock().unwrap();
    data.commands.push(cmd.clone());

    let reply = match cmd.first().map(String::as_str) {
        Some("INCR") => {
            let counter = data.counters.entry(cmd[1].clone()).or_insert(0);
            *counter += 1;
            json!({ "result": *counter })
        }
        Some("PEXPIRE") if data.fail_next_expiry => {
            data.fail_next_expiry = false;
            json!({ "error": "ERR transient failure" })
        }
        Some("PEXPIRE") => json!({ "result": 1 }),
        Some("DEL") => {
            let removed = data.counters.remove(&cmd[1]).is_some();
            json!({ "result": i64::from(removed) })
        }
        _ => json!({ "error": "ERR unknown command" }),
    };
    (StatusCode::OK, Json(reply))
}
