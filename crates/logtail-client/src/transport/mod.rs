//! HTTP transport for log streams.
//!
//! The production implementation opens a `GET` with
//! `Accept: text/event-stream` through reqwest and decodes the body with the
//! core SSE decoder. One `open` call is one connection attempt: retries are
//! the session's job, so nothing here loops or sleeps.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::debug;

use logtail_core::{
    OpenRequest, SseDecoder, SseFrame, TailConnection, TailTransport, TransportError,
};

use crate::config::TailClientConfig;
use crate::error::ClientResult;
use crate::url::stream_url;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Production transport using reqwest.
///
/// The client carries a connect timeout only; a healthy stream may stay
/// open indefinitely.
pub struct ReqwestTransport {
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: &TailClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            auth_token: config.token.clone(),
        })
    }

    /// Build a request with optional authentication.
    fn build_request(&self, url: url::Url) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait]
impl TailTransport for ReqwestTransport {
    async fn open(&self, request: &OpenRequest) -> Result<Box<dyn TailConnection>, TransportError> {
        let url = stream_url(request).map_err(|e| TransportError::connect(e.to_string()))?;
        debug!(url = %url, attempt = request.attempt, "Opening log stream");

        let response = self
            .build_request(url)
            .send()
            .await
            .map_err(|e| TransportError::connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(Box::new(ReqwestConnection::new(response.bytes_stream().boxed())))
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A live SSE response body. Dropping it closes the connection.
pub struct ReqwestConnection {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    ready: VecDeque<SseFrame>,
    ended: bool,
}

impl ReqwestConnection {
    fn new(body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            body,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            ended: false,
        }
    }
}

#[async_trait]
impl TailConnection for ReqwestConnection {
    async fn next_frame(&mut self) -> Option<Result<SseFrame, TransportError>> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Some(Ok(frame));
            }
            if self.ended {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.decoder.push(&chunk)),
                Some(Err(e)) => {
                    self.ended = true;
                    return Some(Err(TransportError::stream(e.to_string())));
                }
                None => {
                    self.ended = true;
                    if self.decoder.has_pending() {
                        debug!("Discarding unterminated event at end of stream");
                    }
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_creation() {
        let config = TailClientConfig::default();
        let transport = ReqwestTransport::new(&config).unwrap();
        assert!(transport.auth_token.is_none());
    }

    #[test]
    fn test_reqwest_transport_with_token() {
        let config = TailClientConfig::new().with_token("test_token");
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.auth_token, Some("test_token".to_string()));
    }

    #[tokio::test]
    async fn test_connection_decodes_frames_across_body_chunks() {
        let parts: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: {\"html\":\"a\",\"offset\":1}\nev")),
            Ok(Bytes::from_static(b"ent: log_update\n\ndata: done\nevent: log_finished\n\n")),
        ];
        let mut conn = ReqwestConnection::new(futures_util::stream::iter(parts).boxed());

        let first = conn.next_frame().await.unwrap().unwrap();
        assert_eq!(first.event, "log_update");
        let second = conn.next_frame().await.unwrap().unwrap();
        assert_eq!(second.event, "log_finished");
        assert!(conn.next_frame().await.is_none());
        assert!(conn.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_connection_drops_partial_event_at_end() {
        let parts: Vec<reqwest::Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"event: log_update\ndata: {\"off"))];
        let mut conn = ReqwestConnection::new(futures_util::stream::iter(parts).boxed());
        assert!(conn.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_connection_delivers_cr_terminated_frame_before_close() {
        let parts: Vec<reqwest::Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"event: log_finished\rdata: no more logs\r\r"))];
        let mut conn = ReqwestConnection::new(futures_util::stream::iter(parts).boxed());

        let frame = conn.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.event, "log_finished");
        assert_eq!(frame.data, "no more logs");
        assert!(conn.next_frame().await.is_none());
    }
}
