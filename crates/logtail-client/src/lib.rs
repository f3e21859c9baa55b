#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod emitter;
mod error;
mod session;
mod sink;
mod transport;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client and sessions
pub use session::{DefaultTailClient, SessionSnapshot, TailClient, TailSession, TailSummary};

// Configuration
pub use config::TailClientConfig;

// Errors
pub use error::{ClientError, ClientResult};

// Transport
pub use transport::{ReqwestConnection, ReqwestTransport};

// Sinks and emitters
pub use emitter::ChannelEmitter;
pub use sink::{DEFAULT_LINE_HEIGHT_PX, DEFAULT_VIEWPORT_HEIGHT_PX, DocumentSink, TerminalSink};

// Silence unused dev-dependency warnings
#[cfg(test)]
use axum as _;
