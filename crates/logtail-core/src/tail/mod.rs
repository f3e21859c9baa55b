//! Tail subscription state machine.
//!
//! This module is a pure state machine for one resumable log subscription.
//! No I/O is performed here; the session driver in `logtail-client` executes
//! the returned effects and feeds their outcomes back as inputs.
//!
//! # Design
//!
//! - Pure synchronous state machine (no async, no IO, no tracing)
//! - Inputs produce effects that the caller uses for side effects
//! - Deterministic: same inputs always produce same outputs
//!
//! # States
//!
//! ```text
//! Idle ─Start─▶ Connecting ─Opened─▶ Streaming ─Errored─▶ Backoff
//!                   ▲                                         │
//!                   └──────────────RetryElapsed───────────────┘
//! Connecting | Streaming ─Completed─▶ Closed(Finished)
//! any non-closed state   ─Stop──────▶ Closed(Stopped)
//! ```

mod backoff;
mod target;

pub use backoff::{Backoff, DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_BACKOFF_SECS};
pub use target::{OpenRequest, TailTarget, container_id};

use serde::Serialize;

use crate::error::TransportError;
use crate::wire::ChunkPayload;

/// Why a subscription reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The server sent a finished event.
    Finished,
    /// The owner stopped the session.
    Stopped,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finished => write!(f, "finished"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// Created, not yet started.
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// Connected and receiving events.
    Streaming,
    /// Waiting `delay_secs` before the next attempt.
    Backoff {
        /// Length of this wait, in backoff units.
        delay_secs: u32,
    },
    /// Terminal.
    Closed(CloseReason),
}

impl TailState {
    /// Lowercase state name for logs and snapshots.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Streaming => "streaming",
            Self::Backoff { .. } => "backoff",
            Self::Closed(_) => "closed",
        }
    }
}

/// Inputs dispatched into [`Subscription::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailInput {
    /// Begin tailing. Idempotent.
    Start,
    /// The pending connection opened.
    Opened,
    /// A log chunk arrived.
    ChunkReceived(ChunkPayload),
    /// Opening or maintaining the connection failed.
    Errored(TransportError),
    /// The server signalled that no more data will be sent.
    Completed,
    /// The backoff wait is over.
    RetryElapsed,
    /// The owner tears the session down.
    Stop,
}

/// Side effects requested by a transition, to be executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEffect {
    /// Open a new connection, replacing any previous handle.
    Open(OpenRequest),
    /// Drop the current connection handle.
    Close,
    /// Append a fragment to a display container.
    Append {
        /// Target container
        container_id: String,
        /// Markup to append verbatim
        html: String,
    },
    /// Arm the retry timer.
    ScheduleRetry {
        /// Wait length, in backoff units
        delay_secs: u32,
    },
    /// Disarm the retry timer.
    CancelRetry,
}

/// One resumable subscription to a phase's log stream.
///
/// Owns the cursor and the backoff counter exclusively; nothing is shared
/// between subscriptions.
#[derive(Debug, Clone)]
pub struct Subscription {
    target: TailTarget,
    container_id: String,
    cursor: u64,
    backoff: Backoff,
    state: TailState,
    attempts: u32,
    chunks_applied: u64,
}

impl Subscription {
    /// Create an idle subscription resuming at `initial_offset`.
    pub fn new(target: TailTarget, initial_offset: u64) -> Self {
        Self::with_backoff(target, initial_offset, Backoff::default())
    }

    /// Create an idle subscription with a custom backoff policy.
    pub fn with_backoff(target: TailTarget, initial_offset: u64, backoff: Backoff) -> Self {
        let container_id = target.container_id();
        Self {
            target,
            container_id,
            cursor: initial_offset,
            backoff,
            state: TailState::Idle,
            attempts: 0,
            chunks_applied: 0,
        }
    }

    pub const fn target(&self) -> &TailTarget {
        &self.target
    }

    pub const fn state(&self) -> TailState {
        self.state
    }

    /// Offset of the last applied chunk (or the initial offset).
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Delay the next failure will wait.
    pub const fn backoff_secs(&self) -> u32 {
        self.backoff.current()
    }

    /// Connection attempts made so far.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn chunks_applied(&self) -> u64 {
        self.chunks_applied
    }

    pub const fn is_closed(&self) -> bool {
        matches!(self.state, TailState::Closed(_))
    }

    /// Apply one input and return the effects to execute.
    pub fn handle(&mut self, input: TailInput) -> Vec<TailEffect> {
        match (self.state, input) {
            (TailState::Idle, TailInput::Start)
            | (TailState::Backoff { .. }, TailInput::RetryElapsed) => vec![self.connect()],

            (TailState::Connecting, TailInput::Opened) => {
                self.state = TailState::Streaming;
                self.backoff.reset();
                Vec::new()
            }

            (TailState::Streaming, TailInput::ChunkReceived(chunk)) => {
                if chunk.offset <= self.cursor {
                    return Vec::new();
                }
                self.cursor = chunk.offset;
                self.chunks_applied += 1;
                vec![TailEffect::Append {
                    container_id: self.container_id.clone(),
                    html: chunk.html,
                }]
            }

            (TailState::Connecting | TailState::Streaming, TailInput::Errored(_)) => {
                let delay_secs = self.backoff.schedule();
                self.state = TailState::Backoff { delay_secs };
                vec![TailEffect::Close, TailEffect::ScheduleRetry { delay_secs }]
            }

            (TailState::Connecting | TailState::Streaming, TailInput::Completed) => {
                self.state = TailState::Closed(CloseReason::Finished);
                vec![TailEffect::Close]
            }

            (TailState::Idle, TailInput::Stop) => {
                self.state = TailState::Closed(CloseReason::Stopped);
                Vec::new()
            }
            (TailState::Connecting | TailState::Streaming, TailInput::Stop) => {
                self.state = TailState::Closed(CloseReason::Stopped);
                vec![TailEffect::Close]
            }
            (TailState::Backoff { .. }, TailInput::Stop) => {
                self.state = TailState::Closed(CloseReason::Stopped);
                vec![TailEffect::CancelRetry]
            }

            // Everything else is stale or redundant for the current state.
            _ => Vec::new(),
        }
    }

    fn connect(&mut self) -> TailEffect {
        self.state = TailState::Connecting;
        self.attempts += 1;
        TailEffect::Open(OpenRequest {
            target: self.target.clone(),
            offset: self.cursor,
            attempt: self.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TailTarget {
        TailTarget::new("http://localhost:8080/logs", "plan").with_run_id("run-123")
    }

    fn chunk(offset: u64, html: &str) -> TailInput {
        TailInput::ChunkReceived(ChunkPayload {
            offset,
            html: html.to_string(),
        })
    }

    fn failure() -> TailInput {
        TailInput::Errored(TransportError::connect("connection refused"))
    }

    fn streaming(offset: u64) -> Subscription {
        let mut sub = Subscription::new(target(), offset);
        sub.handle(TailInput::Start);
        sub.handle(TailInput::Opened);
        sub
    }

    fn open_offset(effects: &[TailEffect]) -> Option<u64> {
        effects.iter().find_map(|effect| match effect {
            TailEffect::Open(request) => Some(request.offset),
            _ => None,
        })
    }

    #[test]
    fn test_start_connects_immediately_at_initial_offset() {
        let mut sub = Subscription::new(target(), 42);
        let effects = sub.handle(TailInput::Start);

        assert_eq!(sub.state(), TailState::Connecting);
        assert_eq!(effects.len(), 1);
        let TailEffect::Open(request) = &effects[0] else {
            panic!("expected open, got {effects:?}");
        };
        assert_eq!(request.offset, 42);
        assert_eq!(request.attempt, 1);
        assert_eq!(request.target.phase, "plan");
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut sub = Subscription::new(target(), 0);
        sub.handle(TailInput::Start);
        assert!(sub.handle(TailInput::Start).is_empty());

        sub.handle(TailInput::Opened);
        assert!(sub.handle(TailInput::Start).is_empty());
        assert_eq!(sub.state(), TailState::Streaming);

        sub.handle(failure());
        assert!(sub.handle(TailInput::Start).is_empty());
        assert!(matches!(sub.state(), TailState::Backoff { .. }));
        assert_eq!(sub.attempts(), 1);
    }

    #[test]
    fn test_chunk_advances_cursor_and_appends() {
        let mut sub = streaming(0);
        let effects = sub.handle(chunk(120, "<div>a</div>"));

        assert_eq!(sub.cursor(), 120);
        assert_eq!(
            effects,
            vec![TailEffect::Append {
                container_id: "tailed-plan-logs".to_string(),
                html: "<div>a</div>".to_string(),
            }]
        );
        assert_eq!(sub.chunks_applied(), 1);
    }

    #[test]
    fn test_resent_chunk_at_cursor_is_dropped() {
        let mut sub = streaming(0);
        sub.handle(chunk(120, "<div>a</div>"));

        assert!(sub.handle(chunk(120, "<div>a</div>")).is_empty());
        assert_eq!(sub.cursor(), 120);
        assert_eq!(sub.chunks_applied(), 1);
    }

    #[test]
    fn test_cursor_is_monotone_over_chunk_sequences() {
        let mut sub = streaming(10);
        let offsets = [15, 15, 40, 12, 0, 41, 100, 99];
        let mut last_applied = 10;
        for offset in offsets {
            let before = sub.cursor();
            let effects = sub.handle(chunk(offset, "x"));
            assert!(sub.cursor() >= before);
            if effects.is_empty() {
                assert!(offset <= before);
            } else {
                last_applied = offset;
            }
            assert_eq!(sub.cursor(), last_applied);
        }
        assert_eq!(sub.cursor(), 100);
        assert_eq!(sub.chunks_applied(), 4);
    }

    #[test]
    fn test_chunks_outside_streaming_are_ignored() {
        let mut sub = Subscription::new(target(), 0);
        assert!(sub.handle(chunk(10, "early")).is_empty());
        sub.handle(TailInput::Start);
        assert!(sub.handle(chunk(10, "before open")).is_empty());
        assert_eq!(sub.cursor(), 0);
    }

    #[test]
    fn test_immediate_failures_grow_backoff_to_cap() {
        let mut sub = Subscription::new(target(), 0);
        sub.handle(TailInput::Start);

        let mut waits = Vec::new();
        for _ in 0..9 {
            let effects = sub.handle(failure());
            assert_eq!(effects[0], TailEffect::Close);
            let TailEffect::ScheduleRetry { delay_secs } = effects[1] else {
                panic!("expected retry, got {effects:?}");
            };
            waits.push(delay_secs);
            assert_eq!(sub.state(), TailState::Backoff { delay_secs });
            let reconnect = sub.handle(TailInput::RetryElapsed);
            assert_eq!(open_offset(&reconnect), Some(0));
        }
        assert_eq!(waits, vec![1, 2, 4, 8, 16, 32, 64, 64, 64]);
        assert_eq!(sub.attempts(), 10);
    }

    #[test]
    fn test_backoff_after_each_failure() {
        let mut sub = Subscription::new(target(), 0);
        sub.handle(TailInput::Start);
        let expected = [2, 4, 8, 16, 32, 64, 64];
        for want in expected {
            sub.handle(failure());
            assert_eq!(sub.backoff_secs(), want);
            sub.handle(TailInput::RetryElapsed);
        }
    }

    #[test]
    fn test_successful_open_resets_backoff() {
        let mut sub = Subscription::new(target(), 0);
        sub.handle(TailInput::Start);
        for _ in 0..3 {
            sub.handle(failure());
            sub.handle(TailInput::RetryElapsed);
        }
        assert_eq!(sub.backoff_secs(), 8);

        sub.handle(TailInput::Opened);
        assert_eq!(sub.backoff_secs(), 1);

        let effects = sub.handle(failure());
        assert_eq!(effects[1], TailEffect::ScheduleRetry { delay_secs: 1 });
        assert_eq!(sub.backoff_secs(), 2);
    }

    #[test]
    fn test_reconnect_resumes_from_last_applied_offset() {
        let mut sub = streaming(0);
        sub.handle(chunk(200, "a"));
        sub.handle(chunk(500, "b"));
        sub.handle(failure());

        let effects = sub.handle(TailInput::RetryElapsed);
        assert_eq!(open_offset(&effects), Some(500));

        sub.handle(TailInput::Opened);
        sub.handle(chunk(750, "c"));
        sub.handle(TailInput::Errored(TransportError::EndOfStream));
        let effects = sub.handle(TailInput::RetryElapsed);
        assert_eq!(open_offset(&effects), Some(750));
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut sub = streaming(0);
        let effects = sub.handle(TailInput::Completed);
        assert_eq!(effects, vec![TailEffect::Close]);
        assert_eq!(sub.state(), TailState::Closed(CloseReason::Finished));

        assert!(sub.handle(failure()).is_empty());
        assert!(sub.handle(TailInput::RetryElapsed).is_empty());
        assert!(sub.handle(TailInput::Start).is_empty());
        assert!(sub.handle(TailInput::Opened).is_empty());
        assert!(sub.handle(chunk(900, "late")).is_empty());
        assert_eq!(sub.state(), TailState::Closed(CloseReason::Finished));
        assert_eq!(sub.attempts(), 1);
    }

    #[test]
    fn test_finished_while_connecting() {
        let mut sub = Subscription::new(target(), 0);
        sub.handle(TailInput::Start);
        assert_eq!(sub.handle(TailInput::Completed), vec![TailEffect::Close]);
        assert!(sub.is_closed());
    }

    #[test]
    fn test_stop_from_each_state() {
        let mut idle = Subscription::new(target(), 0);
        assert!(idle.handle(TailInput::Stop).is_empty());
        assert_eq!(idle.state(), TailState::Closed(CloseReason::Stopped));

        let mut live = streaming(0);
        assert_eq!(live.handle(TailInput::Stop), vec![TailEffect::Close]);
        assert_eq!(live.state(), TailState::Closed(CloseReason::Stopped));

        let mut waiting = streaming(0);
        waiting.handle(failure());
        assert_eq!(waiting.handle(TailInput::Stop), vec![TailEffect::CancelRetry]);
        assert!(waiting.handle(TailInput::RetryElapsed).is_empty());
        assert!(waiting.handle(TailInput::Stop).is_empty());
    }

    #[test]
    fn test_errors_during_backoff_are_ignored() {
        let mut sub = streaming(0);
        sub.handle(failure());
        let backoff = sub.backoff_secs();
        assert!(sub.handle(failure()).is_empty());
        assert_eq!(sub.backoff_secs(), backoff);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(TailState::Idle.name(), "idle");
        assert_eq!(TailState::Backoff { delay_secs: 4 }.name(), "backoff");
        assert_eq!(TailState::Closed(CloseReason::Stopped).name(), "closed");
        assert_eq!(CloseReason::Finished.to_string(), "finished");
    }
}
