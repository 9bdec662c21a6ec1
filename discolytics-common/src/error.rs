// ================================================================
// File: discolytics-common/src/error.rs
// ================================================================

use thiserror::Error;

/// Failure of a single request against the collector or the Discord API.
///
/// Timeouts, DNS failures and refused connections all collapse into
/// `Network`; any non-2xx answer is a `Status`. `Encode` and `Decode` mark
/// bodies that could not be turned into or read from JSON on this side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("invalid JSON in response: {0}")]
    Decode(String),
}

impl TransportFailure {
    /// The HTTP status, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Status { status, .. } => Some(*status),
            TransportFailure::Network(_)
            | TransportFailure::Encode(_)
            | TransportFailure::Decode(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportFailure),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}
