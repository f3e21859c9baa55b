//! Channel-backed event emitter.

use tokio::sync::mpsc;

use logtail_core::{TailEvent, TailEventEmitter};

/// Forwards session events into an unbounded channel.
///
/// Sending never blocks. Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<TailEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TailEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TailEventEmitter for ChannelEmitter {
    fn emit(&self, event: TailEvent) {
        let _ = self.tx.send(event);
    }
}
