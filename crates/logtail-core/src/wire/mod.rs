//! Wire contract of the log stream: SSE framing and event meaning.

mod event;
mod sse;

pub use event::{ChunkPayload, FINISHED_EVENTS, LOG_CHUNK_EVENTS, StreamSignal, classify};
pub use sse::{DEFAULT_EVENT, SseDecoder, SseFrame};
