//! Classification of decoded SSE frames into tail signals.

use serde::{Deserialize, Serialize};

use super::sse::SseFrame;
use crate::error::TransportError;

/// Event names that carry a log chunk.
pub const LOG_CHUNK_EVENTS: &[&str] = &["new-log-chunk", "log_update", "updated"];

/// Event names that signal the end of the log.
pub const FINISHED_EVENTS: &[&str] = &["finished", "log_finished"];

/// Payload of a log chunk event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Cumulative offset the client reaches once this chunk is applied.
    pub offset: u64,
    /// Pre-rendered markup to append verbatim.
    pub html: String,
}

/// What a frame means to a tail session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// New log content.
    Chunk(ChunkPayload),
    /// No more content will be sent.
    Finished,
    /// An event this client does not handle; carries the event name.
    Ignored(String),
}

/// Interpret a frame.
///
/// A chunk event whose data does not decode is a transport error, so the
/// session reconnects from its last applied offset.
pub fn classify(frame: &SseFrame) -> Result<StreamSignal, TransportError> {
    let name = frame.event.as_str();
    if FINISHED_EVENTS.contains(&name) {
        return Ok(StreamSignal::Finished);
    }
    if LOG_CHUNK_EVENTS.contains(&name) {
        let payload: ChunkPayload = serde_json::from_str(&frame.data)
            .map_err(|e| TransportError::malformed(e.to_string()))?;
        return Ok(StreamSignal::Chunk(payload));
    }
    Ok(StreamSignal::Ignored(frame.event.clone()))
}
