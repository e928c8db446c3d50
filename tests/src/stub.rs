//! Stub cluster controller served over real HTTP.
//!
//! Exercises the reqwest-based `ControllerClient` end to end: routing,
//! auth header, query string, status handling and timeouts.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

/// A request seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Clone)]
struct TableResponse {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct StubState {
    tables: Option<(StatusCode, String)>,
    segments: HashMap<String, TableResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a [`StubController`].
#[derive(Default)]
pub struct StubBuilder {
    state: StubState,
}

impl StubBuilder {
    /// Discovery response body.
    pub fn tables(mut self, body: Value) -> Self {
        self.state.tables = Some((StatusCode::OK, body.to_string()));
        self
    }

    /// Discovery responds with an error status.
    pub fn tables_status(mut self, status: u16, body: &str) -> Self {
        self.state.tables = Some((status_code(status), body.to_string()));
        self
    }

    /// Consuming segments info body for a table.
    pub fn segments(self, table: &str, body: Value) -> Self {
        self.raw_segments(table, 200, &body.to_string())
    }

    /// Arbitrary status and body for a table's consuming segments info.
    pub fn raw_segments(mut self, table: &str, status: u16, body: &str) -> Self {
        self.state.segments.insert(
            table.to_string(),
            TableResponse {
                status: status_code(status),
                body: body.to_string(),
                delay: None,
            },
        );
        self
    }

    /// Delays a table's response.
    pub fn slow_segments(mut self, table: &str, body: Value, delay: Duration) -> Self {
        self.state.segments.insert(
            table.to_string(),
            TableResponse {
                status: StatusCode::OK,
                body: body.to_string(),
                delay: Some(delay),
            },
        );
        self
    }

    /// Binds an ephemeral port and starts serving.
    pub async fn start(self) -> StubController {
        let state = Arc::new(self.state);

        let app = Router::new()
            .route("/tables", get(list_tables))
            .route("/tables/:table/consumingSegmentsInfo", get(consuming_info))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub controller");
        let addr = listener.local_addr().expect("Stub controller has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub controller failed");
        });

        StubController {
            addr,
            state,
            handle,
        }
    }
}

/// Running stub controller. Stops serving when dropped.
pub struct StubController {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubController {
    pub fn builder() -> StubBuilder {
        StubBuilder::default()
    }

    /// Base URL to use as a cluster's controller URL.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

impl Drop for StubController {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("invalid status code")
}

fn record(state: &StubState, path: String, headers: &HeaderMap, query: HashMap<String, String>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().push(RecordedRequest {
        path,
        authorization,
        query,
    });
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn list_tables(
    State(state): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, "/tables".to_string(), &headers, query);

    match &state.tables {
        Some((status, body)) => json_response(*status, body.clone()),
        None => json_response(StatusCode::OK, r#"{"tables": []}"#.to_string()),
    }
}

async fn consuming_info(
    State(state): State<Arc<StubState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(
        &state,
        format!("/tables/{}/consumingSegmentsInfo", table),
        &headers,
        HashMap::new(),
    );

    let Some(response) = state.segments.get(&table).cloned() else {
        return json_response(
            StatusCode::NOT_FOUND,
            format!(r#"{{"code": 404, "error": "Table {} not found"}}"#, table),
        );
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    json_response(response.status, response.body)
}
