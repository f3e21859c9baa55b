//! Common test utilities.
//!
//! An in-process SSE log server that answers each phase from its own
//! script, so sessions running side by side see deterministic streams.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Events for one request as (name, data), then close or keep it open.
#[derive(Clone)]
pub struct Script {
    pub events: Vec<(String, String)>,
    pub hang: bool,
}

pub fn chunk(offset: u64, html: &str) -> (String, String) {
    (
        "log_update".to_string(),
        serde_json::json!({ "offset": offset, "html": html }).to_string(),
    )
}

pub fn finished() -> (String, String) {
    ("log_finished".to_string(), "no more logs".to_string())
}

#[derive(Clone, Default)]
struct ServerState {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Script>>>>,
    phases: Arc<Mutex<Vec<String>>>,
}

pub struct TestServer {
    pub endpoint: String,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve each phase its scripts in order; unknown or exhausted phases
    /// get a 503.
    pub async fn start(scripts: Vec<(&str, Vec<Script>)>) -> Self {
        let scripts = scripts
            .into_iter()
            .map(|(phase, replies)| (phase.to_string(), replies.into()))
            .collect();
        let state = ServerState {
            scripts: Arc::new(Mutex::new(scripts)),
            phases: Arc::default(),
        };
        let app = Router::new()
            .route("/app/runs/tail", get(tail))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/app/runs/tail"),
            state,
            handle,
        }
    }

    /// `phase` query value of every request so far.
    pub fn phases(&self) -> Vec<String> {
        self.state.phases.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn tail(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let phase = query.get("phase").cloned().unwrap_or_default();
    state.phases.lock().unwrap().push(phase.clone());

    let script = state
        .scripts
        .lock()
        .unwrap()
        .get_mut(&phase)
        .and_then(VecDeque::pop_front);
    let Some(Script { events, hang }) = script else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let events = stream::iter(
        events
            .into_iter()
            .map(|(name, data)| Ok::<_, Infallible>(Event::default().event(name).data(data))),
    );
    if hang {
        Sse::new(events.chain(stream::pending())).into_response()
    } else {
        Sse::new(events).into_response()
    }
}

/// Writer whose bytes stay readable after it is handed away.
#[derive(Clone, Default)]
pub struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
