//! In-process mock of the HitePro device API
//!
//! Serves `GET /devices/`, `GET /devices/:id` and `PUT /devices/:id/:value`
//! on an ephemeral port, enforces Basic auth and counts requests.

#![allow(dead_code)]

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use hp_client::HubClient;
use hp_core::Credentials;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const USER: &str = "tester";
pub const PASS: &str = "s3cret";

#[derive(Clone)]
struct HubState {
    authorization: Arc<String>,
    directory_status: StatusCode,
    directory_body: Arc<Value>,
    device_bodies: Arc<HashMap<String, Value>>,
    command_body: Arc<Value>,
    delays: Arc<HashMap<String, Duration>>,
    directory_fetches: Arc<AtomicUsize>,
    device_requests: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
}

/// Builder for a [`MockHub`]
pub struct MockHubBuilder {
    devices: Vec<Value>,
    directory: Option<(StatusCode, Value)>,
    device_bodies: HashMap<String, Value>,
    command_body: Value,
    delays: HashMap<String, Duration>,
}

impl MockHubBuilder {
    /// Add a device to the directory with `{"status": status}` as its body
    pub fn device(mut self, id: &str, device_type: &str, status: Value) -> Self {
        self.devices.push(json!({
            "id": id,
            "type": device_type,
            "name": format!("{device_type} {id}"),
        }));
        self.device_bodies
            .insert(id.to_string(), json!({ "id": id, "status": status }));
        self
    }

    /// Add a device whose status endpoint returns `body` verbatim
    pub fn device_with_body(mut self, id: &str, device_type: &str, body: Value) -> Self {
        self.devices.push(json!({"id": id, "type": device_type}));
        self.device_bodies.insert(id.to_string(), body);
        self
    }

    /// Replace the directory response entirely
    pub fn directory_response(mut self, status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.directory = Some((status, body));
        self
    }

    /// Body returned by every command
    pub fn command_body(mut self, body: Value) -> Self {
        self.command_body = body;
        self
    }

    /// Delay every response for device `id`
    pub fn delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub async fn spawn(self) -> MockHub {
        let (directory_status, directory_body) = self
            .directory
            .unwrap_or((StatusCode::OK, Value::Array(self.devices)));

        let state = HubState {
            authorization: Arc::new(Credentials::new(USER, PASS).authorization_header()),
            directory_status,
            directory_body: Arc::new(directory_body),
            device_bodies: Arc::new(self.device_bodies),
            command_body: Arc::new(self.command_body),
            delays: Arc::new(self.delays),
            directory_fetches: Arc::new(AtomicUsize::new(0)),
            device_requests: Arc::new(AtomicUsize::new(0)),
            commands: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/devices/", get(list_devices))
            .route("/devices/:id", get(device_status))
            .route("/devices/:id/:value", put(send_command))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock hub");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let join = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockHub {
            base_url,
            state,
            join,
        }
    }
}

/// Running mock hub; aborted on drop
pub struct MockHub {
    base_url: String,
    state: HubState,
    join: JoinHandle<()>,
}

impl MockHub {
    pub fn builder() -> MockHubBuilder {
        MockHubBuilder {
            devices: Vec::new(),
            directory: None,
            device_bodies: HashMap::new(),
            command_body: json!({"result": "Command send"}),
            delays: HashMap::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client with the credentials the hub accepts
    pub fn client(&self) -> HubClient {
        self.client_with(Credentials::new(USER, PASS), Duration::from_secs(5))
    }

    pub fn client_with(&self, credentials: Credentials, timeout: Duration) -> HubClient {
        HubClient::new(&self.base_url, &credentials, timeout).expect("build client")
    }

    pub fn directory_fetches(&self) -> usize {
        self.state.directory_fetches.load(Ordering::SeqCst)
    }

    /// Status and command requests combined
    pub fn device_requests(&self) -> usize {
        self.state.device_requests.load(Ordering::SeqCst)
    }

    /// Commands received, as "id/value[?query]"
    pub fn commands(&self) -> Vec<String> {
        self.state
            .commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl Drop for MockHub {
    fn drop(&mut self) {
        self.join.abort();
    }
}

fn authorized(state: &HubState, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.authorization.as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response()
}

async fn list_devices(State(state): State<HubState>, headers: HeaderMap) -> Response {
    state.directory_fetches.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    (state.directory_status, Json((*state.directory_body).clone())).into_response()
}

async fn device_status(
    State(state): State<HubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.device_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if let Some(delay) = state.delays.get(&id) {
        tokio::time::sleep(*delay).await;
    }
    match state.device_bodies.get(&id) {
        Some(body) => (StatusCode::OK, Json(body.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "no such device"}))).into_response(),
    }
}

async fn send_command(
    State(state): State<HubState>,
    Path((id, value)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    state.device_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if let Some(delay) = state.delays.get(&id) {
        tokio::time::sleep(*delay).await;
    }
    let entry = match query {
        Some(q) => format!("{}/{}?{}", id, value, q),
        None => format!("{}/{}", id, value),
    };
    if let Ok(mut commands) = state.commands.lock() {
        commands.push(entry);
    }
    if !state.device_bodies.contains_key(&id) {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no such device"}))).into_response();
    }
    (StatusCode::OK, Json((*state.command_body).clone())).into_response()
}
