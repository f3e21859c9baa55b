//! Public configuration for the tail client.
//!
//! This module provides a stable public API for configuring the transport
//! and every session created by a client.

use std::time::Duration;

use logtail_core::DEFAULT_NEAR_BOTTOM_THRESHOLD_PX;
use logtail_core::tail::{DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_BACKOFF_SECS};

/// Configuration for the tail client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use logtail_client::TailClientConfig;
/// use std::time::Duration;
///
/// let config = TailClientConfig::new()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_max_backoff_secs(30)
///     .with_user_agent("my-dashboard/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct TailClientConfig {
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Optional bearer token
    pub(crate) token: Option<String>,
    /// Timeout for establishing a connection (not for the stream itself)
    pub(crate) connect_timeout: Duration,
    /// First retry delay, in backoff units
    pub(crate) initial_backoff_secs: u32,
    /// Retry delay ceiling, in backoff units
    pub(crate) max_backoff_secs: u32,
    /// Wall-clock length of one backoff unit
    pub(crate) backoff_unit: Duration,
    /// Distance from the bottom still treated as "following"
    pub(crate) near_bottom_threshold_px: u32,
}

impl Default for TailClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("logtail/", env!("CARGO_PKG_VERSION")).to_string(),
            token: None,
            connect_timeout: Duration::from_secs(10),
            initial_backoff_secs: DEFAULT_INITIAL_BACKOFF_SECS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
            backoff_unit: Duration::from_secs(1),
            near_bottom_threshold_px: DEFAULT_NEAR_BOTTOM_THRESHOLD_PX,
        }
    }
}

impl TailClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a bearer token sent with every connection.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an optional bearer token.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the connect timeout.
    ///
    /// Defaults to 10 seconds. An open stream never times out.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the first retry delay.
    ///
    /// Defaults to 1.
    #[must_use]
    pub const fn with_initial_backoff_secs(mut self, secs: u32) -> Self {
        self.initial_backoff_secs = secs;
        self
    }

    /// Set the retry delay ceiling.
    ///
    /// Defaults to 64.
    #[must_use]
    pub const fn with_max_backoff_secs(mut self, secs: u32) -> Self {
        self.max_backoff_secs = secs;
        self
    }

    /// Set the wall-clock length of one backoff unit.
    ///
    /// Defaults to one second. Shorter units are useful against local test
    /// servers.
    #[must_use]
    pub const fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Set the stick-to-bottom threshold in pixels.
    ///
    /// Defaults to 100.
    #[must_use]
    pub const fn with_near_bottom_threshold(mut self, px: u32) -> Self {
        self.near_bottom_threshold_px = px;
        self
    }
}
