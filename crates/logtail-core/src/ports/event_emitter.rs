//! Event emitter trait for observing tail sessions.
//!
//! Implementations handle transport details (logging, channels, progress
//! displays). The session driver only ever calls [`TailEventEmitter::emit`].

use crate::events::TailEvent;

/// Trait for emitting tail session events.
///
/// # Implementations
///
/// - `NoopTailEmitter` - For contexts that don't need events
/// - Adapter-specific implementations (channel forwarding, recorders in tests)
pub trait TailEventEmitter: Send + Sync {
    /// Emit an event. Must not block.
    fn emit(&self, event: TailEvent);
}

/// A no-op event emitter.
///
/// Discards all events; the session still logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTailEmitter;

impl NoopTailEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl TailEventEmitter for NoopTailEmitter {
    fn emit(&self, _event: TailEvent) {
        // Intentionally do nothing
    }
}
