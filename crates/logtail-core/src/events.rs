//! Observable session events.
//!
//! Emitted by the session driver through
//! [`TailEventEmitter`](crate::ports::TailEventEmitter). They carry no data
//! the subscription needs back; they exist for logging, progress display and
//! tests.

use serde::Serialize;

use crate::tail::CloseReason;

/// Something observable happened in a tail session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TailEvent {
    /// A connection attempt started.
    Connecting { phase: String, offset: u64, attempt: u32 },
    /// The server accepted the stream.
    Connected { phase: String },
    /// A chunk was appended.
    ChunkApplied { phase: String, offset: u64, bytes: usize },
    /// A chunk at or behind the cursor was dropped.
    ChunkSkipped { phase: String, offset: u64, cursor: u64 },
    /// The connection failed or dropped.
    Disconnected { phase: String, reason: String },
    /// A reconnect was scheduled.
    RetryScheduled { phase: String, delay_secs: u32 },
    /// The session reached its terminal state.
    Closed { phase: String, reason: CloseReason },
}

impl TailEvent {
    /// Phase the event belongs to.
    pub fn phase(&self) -> &str {
        match self {
            Self::Connecting { phase, .. }
            | Self::Connected { phase }
            | Self::ChunkApplied { phase, .. }
            | Self::ChunkSkipped { phase, .. }
            | Self::Disconnected { phase, .. }
            | Self::RetryScheduled { phase, .. }
            | Self::Closed { phase, .. } => phase,
        }
    }
}
