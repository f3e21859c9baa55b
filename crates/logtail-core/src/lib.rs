#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod error;
pub mod events;
pub mod ports;
pub mod render;
pub mod tail;
pub mod wire;

// Re-export commonly used types for convenience
pub use error::TransportError;
pub use events::TailEvent;
pub use ports::{NoopTailEmitter, TailConnection, TailEventEmitter, TailSinkPort, TailTransport};
pub use render::{
    DEFAULT_NEAR_BOTTOM_THRESHOLD_PX, Viewport, apply_chunk, html_to_text, is_near_bottom,
};
pub use tail::{
    Backoff, CloseReason, OpenRequest, Subscription, TailEffect, TailInput, TailState, TailTarget,
    container_id,
};
pub use wire::{ChunkPayload, SseDecoder, SseFrame, StreamSignal, classify};
