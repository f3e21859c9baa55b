//! Scripted log stream server on an ephemeral port.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the server answers one request.
#[derive(Clone)]
pub enum Reply {
    Status(StatusCode),
    /// Send `events` as (name, data), then close or keep the stream open.
    Events {
        events: Vec<(String, String)>,
        hang: bool,
    },
}

impl Reply {
    pub fn closing(events: Vec<(String, String)>) -> Self {
        Self::Events {
            events,
            hang: false,
        }
    }

    pub fn hanging(events: Vec<(String, String)>) -> Self {
        Self::Events { events, hang: true }
    }
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

/// What the server saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub query: HashMap<String, String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct ServerState {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct TestServer {
    pub endpoint: String,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve `replies` in order; once exhausted every request gets a 503.
    pub async fn start(replies: Vec<Reply>) -> Self {
        let state = ServerState {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
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

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// `offset` query value of every request so far.
    pub fn offsets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.query.get("offset").cloned().unwrap_or_default())
            .collect()
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
    headers: HeaderMap,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(Recorded {
        query,
        accept: header_value(header::ACCEPT),
        authorization: header_value(header::AUTHORIZATION),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Reply::Status(StatusCode::SERVICE_UNAVAILABLE));

    match reply {
        Reply::Status(status) => status.into_response(),
        Reply::Events { events, hang } => {
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
    }
}
