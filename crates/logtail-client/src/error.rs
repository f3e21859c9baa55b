//! Errors surfaced by the client API.
//!
//! Connection failures never appear here: a running session recovers from
//! them internally. These errors only cover construction and misuse.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from building a client or a session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint is not a valid absolute URL.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// The endpoint as given
        endpoint: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },

    /// The endpoint uses a scheme other than http or https.
    #[error("Unsupported endpoint scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The session task panicked or was aborted.
    #[error("Tail session aborted: {message}")]
    SessionAborted {
        /// Join error description
        message: String,
    },
}
