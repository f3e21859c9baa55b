//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` types in any signature
//! - Transports open exactly one connection per call and never retry
//! - Sinks and emitters never report failures back to the session

pub mod event_emitter;
pub mod sink;
pub mod transport;

pub use event_emitter::{NoopTailEmitter, TailEventEmitter};
pub use sink::TailSinkPort;
pub use transport::{TailConnection, TailTransport};
