//! CLI-specific error types and exit codes.

use logtail_client::ClientError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument combination clap cannot reject on its own.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Unusable endpoint or client settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A session task failed.
    #[error("{0}")]
    Session(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 78: Configuration error (sysexits.h `EX_CONFIG`)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Session(_) => 1,
            Self::Arguments(_) => 2,
            Self::Config(_) => 78,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidEndpoint { .. }
            | ClientError::UnsupportedScheme { .. }
            | ClientError::HttpClient(_) => Self::Config(err.to_string()),
            ClientError::SessionAborted { .. } => Self::Session(err.to_string()),
        }
    }
}
