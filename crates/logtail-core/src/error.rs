//! Error taxonomy for a tail session.
//!
//! There is exactly one failure kind, [`TransportError`]. Every variant is
//! recovered the same way (close, back off, reconnect from the cursor), so
//! the variants exist for logging only. Stream completion is not an error;
//! it arrives as [`TailInput::Completed`](crate::tail::TailInput::Completed).

use thiserror::Error;

/// Any failure to open or maintain the log stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established (refused, DNS, TLS, timeout).
    #[error("connection failed: {message}")]
    Connect {
        /// Description from the underlying client
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The connection dropped while streaming.
    #[error("stream interrupted: {message}")]
    Stream {
        /// Description from the underlying client
        message: String,
    },

    /// The server closed the stream without sending a finished event.
    #[error("stream ended before the finished event")]
    EndOfStream,

    /// A log chunk event carried a payload that could not be decoded.
    #[error("malformed log chunk payload: {message}")]
    MalformedChunk {
        /// What was wrong with the payload
        message: String,
    },
}

impl TransportError {
    /// Construct a [`TransportError::Connect`].
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Construct a [`TransportError::Stream`].
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Construct a [`TransportError::MalformedChunk`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedChunk {
            message: message.into(),
        }
    }

    /// Short stable label, used as a structured logging field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Status { .. } => "status",
            Self::Stream { .. } => "stream",
            Self::EndOfStream => "end_of_stream",
            Self::MalformedChunk { .. } => "malformed_chunk",
        }
    }
}
