//! Tail client and sessions.
//!
//! A [`TailClient`] holds the transport, configuration and event emitter
//! shared by every session it creates. A [`TailSession`] follows one phase:
//! `start` spawns its driver task, `stop` tears it down, and `wait` yields a
//! [`TailSummary`] once the session closes.

mod driver;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use logtail_core::{
    Backoff, CloseReason, NoopTailEmitter, Subscription, TailEventEmitter, TailSinkPort, TailState,
    TailTarget, TailTransport,
};

use crate::config::TailClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::ReqwestTransport;
use crate::url::parse_endpoint;

use driver::{Driver, DriverDeps};

// ============================================================================
// Type Aliases
// ============================================================================

/// Tail client using the reqwest transport.
pub type DefaultTailClient = TailClient<ReqwestTransport>;

// ============================================================================
// Client
// ============================================================================

/// Factory for tail sessions.
///
/// Generic over the transport so tests can substitute a scripted one. Use
/// [`DefaultTailClient`] for real endpoints.
pub struct TailClient<T: TailTransport + 'static> {
    config: TailClientConfig,
    transport: Arc<T>,
    emitter: Arc<dyn TailEventEmitter>,
}

impl DefaultTailClient {
    /// Create a client with the reqwest transport.
    pub fn new(config: TailClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: TailTransport + 'static> TailClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(config: TailClientConfig, transport: T) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            emitter: Arc::new(NoopTailEmitter),
        }
    }

    /// Observe every session through `emitter`.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn TailEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Create an idle session for `target`, resuming at `initial_offset`.
    ///
    /// Fails only if the endpoint is not an absolute http(s) URL. Nothing
    /// connects until [`TailSession::start`].
    pub fn session(
        &self,
        target: TailTarget,
        initial_offset: u64,
        sink: Arc<dyn TailSinkPort>,
    ) -> ClientResult<TailSession> {
        parse_endpoint(&target.endpoint)?;

        let backoff = Backoff::new(self.config.initial_backoff_secs, self.config.max_backoff_secs);
        let subscription = Subscription::with_backoff(target, initial_offset, backoff);
        let phase = subscription.target().phase.clone();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::of(&subscription));
        let cancel = CancellationToken::new();

        let deps = DriverDeps {
            transport: self.transport.clone(),
            sink,
            emitter: Arc::clone(&self.emitter),
            backoff_unit: self.config.backoff_unit,
            near_bottom_threshold_px: self.config.near_bottom_threshold_px,
        };

        Ok(TailSession {
            phase,
            driver: Some(Driver::new(subscription, deps, cancel.clone(), snapshot_tx)),
            handle: None,
            cancel,
            snapshot_rx,
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// Point-in-time view of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: TailState,
    /// Offset of the last applied chunk.
    pub cursor: u64,
    /// Delay the next failure will wait.
    pub backoff_secs: u32,
    /// Connection attempts made so far.
    pub attempts: u32,
}

impl SessionSnapshot {
    pub(crate) const fn of(subscription: &Subscription) -> Self {
        Self {
            state: subscription.state(),
            cursor: subscription.cursor(),
            backoff_secs: subscription.backoff_secs(),
            attempts: subscription.attempts(),
        }
    }
}

/// Outcome of a closed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailSummary {
    pub phase: String,
    /// Offset to resume from in a later session.
    pub final_offset: u64,
    pub chunks_applied: u64,
    pub attempts: u32,
    /// Attempts after the first.
    pub reconnects: u32,
    pub reason: CloseReason,
}

/// A tail of one phase. Dropping the session stops it.
pub struct TailSession {
    phase: String,
    driver: Option<Driver>,
    handle: Option<JoinHandle<TailSummary>>,
    cancel: CancellationToken,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl TailSession {
    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Begin tailing. Returns `false` if the session was already started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        match self.driver.take() {
            Some(driver) => {
                self.handle = Some(tokio::spawn(driver.run()));
                true
            }
            None => false,
        }
    }

    /// Close the connection or cancel the pending retry. The session does
    /// not reconnect afterwards.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token that stops this session when cancelled, for owners that hand
    /// the session itself to [`TailSession::wait`].
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        *self.snapshot_rx.borrow()
    }

    /// Receiver updated after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Run the session to completion, starting it if needed.
    pub async fn wait(mut self) -> ClientResult<TailSummary> {
        self.start();
        let handle = self.handle.take().ok_or_else(|| ClientError::SessionAborted {
            message: "session task already collected".to_string(),
        })?;
        handle.await.map_err(|e| ClientError::SessionAborted {
            message: e.to_string(),
        })
    }
}

impl Drop for TailSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
