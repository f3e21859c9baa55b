//! Scripted transport for driver tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use logtail_core::{OpenRequest, SseFrame, TailConnection, TailTransport, TransportError};

/// What one connection attempt does.
#[derive(Clone)]
pub enum Attempt {
    /// `open` fails.
    Refuse(TransportError),
    /// `open` succeeds and the connection yields these items in order.
    Stream {
        frames: Vec<Result<SseFrame, TransportError>>,
        /// After the frames: stay silent forever instead of ending.
        then_hang: bool,
    },
}

impl Attempt {
    pub fn refused() -> Self {
        Self::Refuse(TransportError::connect("connection refused"))
    }

    pub fn frames(frames: Vec<Result<SseFrame, TransportError>>) -> Self {
        Self::Stream {
            frames,
            then_hang: false,
        }
    }

    pub fn frames_then_hang(frames: Vec<Result<SseFrame, TransportError>>) -> Self {
        Self::Stream {
            frames,
            then_hang: true,
        }
    }
}

pub fn event(name: &str, data: &str) -> Result<SseFrame, TransportError> {
    Ok(SseFrame {
        event: name.to_string(),
        data: data.to_string(),
        id: None,
        retry: None,
    })
}

pub fn chunk(offset: u64, html: &str) -> Result<SseFrame, TransportError> {
    let data = format!(r#"{{"offset":{offset},"html":{}}}"#, serde_json::json!(html));
    event("log_update", &data)
}

pub fn finished() -> Result<SseFrame, TransportError> {
    event("log_finished", "no more logs")
}

/// A transport that plays back one [`Attempt`] per `open` call and records
/// every request. Once the script is exhausted, every further attempt is
/// refused.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    requests: Arc<Mutex<Vec<OpenRequest>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Attempt>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<OpenRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.requests().iter().map(|r| r.offset).collect()
    }
}

#[async_trait]
impl TailTransport for ScriptedTransport {
    async fn open(&self, request: &OpenRequest) -> Result<Box<dyn TailConnection>, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let attempt = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Attempt::refused);

        match attempt {
            Attempt::Refuse(error) => Err(error),
            Attempt::Stream { frames, then_hang } => Ok(Box::new(ScriptedConnection {
                frames: frames.into(),
                then_hang,
            })),
        }
    }
}

struct ScriptedConnection {
    frames: VecDeque<Result<SseFrame, TransportError>>,
    then_hang: bool,
}

#[async_trait]
impl TailConnection for ScriptedConnection {
    async fn next_frame(&mut self) -> Option<Result<SseFrame, TransportError>> {
        match self.frames.pop_front() {
            Some(item) => Some(item),
            None if self.then_hang => std::future::pending().await,
            None => None,
        }
    }
}
