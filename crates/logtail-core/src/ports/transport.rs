//! Transport port: opening and reading a one-way event stream.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::tail::OpenRequest;
use crate::wire::SseFrame;

/// Opens connections to a log stream.
///
/// One call to [`TailTransport::open`] corresponds to one connection
/// attempt. Implementations must not retry internally; retry policy belongs
/// to the subscription.
#[async_trait]
pub trait TailTransport: Send + Sync {
    /// Open a stream for `request`. Resolves once the server accepted it.
    async fn open(&self, request: &OpenRequest) -> Result<Box<dyn TailConnection>, TransportError>;
}

/// A live connection handle. Dropping it closes the connection.
#[async_trait]
pub trait TailConnection: Send {
    /// Next dispatched frame.
    ///
    /// `None` means the server closed the stream.
    async fn next_frame(&mut self) -> Option<Result<SseFrame, TransportError>>;
}
