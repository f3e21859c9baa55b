//! Session driver task.
//!
//! Runs one [`Subscription`] to completion: feeds inputs into the state
//! machine, executes the effects it returns and turns I/O outcomes back into
//! inputs.
//!
//! # Design Principles
//!
//! - The subscription is owned by this task; nothing else mutates it
//! - Every await point is raced against the cancellation token
//! - Effects are executed in the order the state machine returned them
//! - Progress goes out through the `watch` channel and the event emitter only

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logtail_core::{
    CloseReason, OpenRequest, StreamSignal, Subscription, TailConnection, TailEffect, TailEvent,
    TailEventEmitter, TailInput, TailSinkPort, TailState, TailTransport, TransportError,
    apply_chunk, classify,
};

use super::{SessionSnapshot, TailSummary};

/// Cloned dependencies of one session task.
#[derive(Clone)]
pub(crate) struct DriverDeps {
    pub transport: Arc<dyn TailTransport>,
    pub sink: Arc<dyn TailSinkPort>,
    pub emitter: Arc<dyn TailEventEmitter>,
    pub backoff_unit: Duration,
    pub near_bottom_threshold_px: u32,
}

pub(crate) struct Driver {
    subscription: Subscription,
    deps: DriverDeps,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    connection: Option<Box<dyn TailConnection>>,
    retry_delay: Option<u32>,
    reconnects: u32,
    phase: String,
}

impl Driver {
    pub(crate) fn new(
        subscription: Subscription,
        deps: DriverDeps,
        cancel: CancellationToken,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let phase = subscription.target().phase.clone();
        Self {
            subscription,
            deps,
            cancel,
            snapshot_tx,
            connection: None,
            retry_delay: None,
            reconnects: 0,
            phase,
        }
    }

    /// Drive the subscription until it closes.
    pub(crate) async fn run(mut self) -> TailSummary {
        let mut pending = VecDeque::new();
        pending.push_back(if self.cancel.is_cancelled() {
            TailInput::Stop
        } else {
            TailInput::Start
        });

        loop {
            while let Some(input) = pending.pop_front() {
                let effects = self.dispatch(input);
                for effect in effects {
                    if let Some(next) = self.execute(effect).await {
                        pending.push_back(next);
                    }
                }
                self.publish();
            }

            if self.subscription.is_closed() {
                break;
            }
            pending.push_back(self.next_input().await);
        }

        self.summary()
    }

    /// Wait for whatever the current state is waiting on.
    async fn next_input(&mut self) -> TailInput {
        match self.subscription.state() {
            TailState::Streaming => loop {
                let Some(connection) = self.connection.as_mut() else {
                    return TailInput::Errored(TransportError::EndOfStream);
                };
                let frame = tokio::select! {
                    biased;

                    () = self.cancel.cancelled() => return TailInput::Stop,

                    frame = connection.next_frame() => frame,
                };

                return match frame {
                    None => TailInput::Errored(TransportError::EndOfStream),
                    Some(Err(error)) => TailInput::Errored(error),
                    Some(Ok(frame)) => match classify(&frame) {
                        Ok(StreamSignal::Chunk(payload)) => TailInput::ChunkReceived(payload),
                        Ok(StreamSignal::Finished) => TailInput::Completed,
                        Ok(StreamSignal::Ignored(name)) => {
                            debug!(phase = %self.phase, event = %name, "Ignoring unhandled event");
                            continue;
                        }
                        Err(error) => TailInput::Errored(error),
                    },
                };
            },
            TailState::Backoff { delay_secs } => {
                let delay = self.retry_delay.unwrap_or(delay_secs);
                tokio::select! {
                    biased;

                    () = self.cancel.cancelled() => TailInput::Stop,

                    () = tokio::time::sleep(self.deps.backoff_unit * delay) => {
                        self.retry_delay = None;
                        TailInput::RetryElapsed
                    }
                }
            }
            // Connecting is resolved inside `execute`, so only an idle or
            // closed machine can land here.
            TailState::Idle | TailState::Connecting | TailState::Closed(_) => TailInput::Stop,
        }
    }

    /// Feed one input to the subscription and emit what became observable.
    fn dispatch(&mut self, input: TailInput) -> Vec<TailEffect> {
        let before = self.subscription.state();
        let cursor_before = self.subscription.cursor();
        let chunk = match &input {
            TailInput::ChunkReceived(payload) => Some((payload.offset, payload.html.len())),
            _ => None,
        };
        let failure = match &input {
            TailInput::Errored(error) => Some(error.clone()),
            _ => None,
        };

        let effects = self.subscription.handle(input);
        let after = self.subscription.state();

        if before == TailState::Connecting && after == TailState::Streaming {
            info!(phase = %self.phase, offset = self.subscription.cursor(), "Log stream connected");
            self.emit(TailEvent::Connected {
                phase: self.phase.clone(),
            });
        }

        if let Some((offset, bytes)) = chunk {
            if effects.is_empty() {
                if before == TailState::Streaming {
                    debug!(phase = %self.phase, offset, cursor = cursor_before, "Skipping chunk behind cursor");
                    self.emit(TailEvent::ChunkSkipped {
                        phase: self.phase.clone(),
                        offset,
                        cursor: cursor_before,
                    });
                }
            } else {
                debug!(phase = %self.phase, offset, bytes, "Applying chunk");
                self.emit(TailEvent::ChunkApplied {
                    phase: self.phase.clone(),
                    offset,
                    bytes,
                });
            }
        }

        if let Some(error) = failure
            && matches!(after, TailState::Backoff { .. })
            && !matches!(before, TailState::Backoff { .. })
        {
            warn!(phase = %self.phase, kind = error.kind(), error = %error, "Log stream disconnected");
            self.emit(TailEvent::Disconnected {
                phase: self.phase.clone(),
                reason: error.to_string(),
            });
        }

        if let TailState::Closed(reason) = after
            && !matches!(before, TailState::Closed(_))
        {
            info!(
                phase = %self.phase,
                reason = %reason,
                offset = self.subscription.cursor(),
                "Tail session closed"
            );
            self.emit(TailEvent::Closed {
                phase: self.phase.clone(),
                reason,
            });
        }

        effects
    }

    /// Execute one effect. Opening a connection resolves to the next input.
    async fn execute(&mut self, effect: TailEffect) -> Option<TailInput> {
        match effect {
            TailEffect::Open(request) => Some(self.open(request).await),
            TailEffect::Close => {
                self.connection = None;
                None
            }
            TailEffect::Append { container_id, html } => {
                apply_chunk(
                    self.deps.sink.as_ref(),
                    &container_id,
                    &html,
                    self.deps.near_bottom_threshold_px,
                );
                None
            }
            TailEffect::ScheduleRetry { delay_secs } => {
                debug!(phase = %self.phase, delay_secs, "Scheduling reconnect");
                self.retry_delay = Some(delay_secs);
                self.emit(TailEvent::RetryScheduled {
                    phase: self.phase.clone(),
                    delay_secs,
                });
                None
            }
            TailEffect::CancelRetry => {
                self.retry_delay = None;
                None
            }
        }
    }

    async fn open(&mut self, request: OpenRequest) -> TailInput {
        if request.attempt > 1 {
            self.reconnects += 1;
        }
        debug!(
            phase = %self.phase,
            offset = request.offset,
            attempt = request.attempt,
            "Connecting to log stream"
        );
        self.emit(TailEvent::Connecting {
            phase: self.phase.clone(),
            offset: request.offset,
            attempt: request.attempt,
        });
        self.publish();

        let transport = Arc::clone(&self.deps.transport);
        tokio::select! {
            biased;

            () = self.cancel.cancelled() => TailInput::Stop,

            result = transport.open(&request) => match result {
                Ok(connection) => {
                    self.connection = Some(connection);
                    TailInput::Opened
                }
                Err(error) => TailInput::Errored(error),
            },
        }
    }

    fn emit(&self, event: TailEvent) {
        self.deps.emitter.emit(event);
    }

    fn publish(&self) {
        self.snapshot_tx
            .send_replace(SessionSnapshot::of(&self.subscription));
    }

    fn summary(&self) -> TailSummary {
        let reason = match self.subscription.state() {
            TailState::Closed(reason) => reason,
            _ => CloseReason::Stopped,
        };
        TailSummary {
            phase: self.phase.clone(),
            final_offset: self.subscription.cursor(),
            chunks_applied: self.subscription.chunks_applied(),
            attempts: self.subscription.attempts(),
            reconnects: self.reconnects,
            reason,
        }
    }
}
