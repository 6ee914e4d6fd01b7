//! Fayda client error types.

use thiserror::Error;

pub type FaydaResult<T> = Result<T, FaydaError>;

#[derive(Debug, Error)]
pub enum FaydaError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to import private key: {source}")]
    KeyImport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The provider answered with a non-success status.
    #[error("Fayda API error: {message}")]
    RemoteApi { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Invalid user info response: {0}")]
    InvalidUserInfoResponse(String),

    #[error("Client assertion signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FaydaError {
    pub(crate) fn key_import(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::KeyImport {
            source: source.into(),
        }
    }
}

/// Failures where no response came back from the provider.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("HTTP request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Http(err)
        }
    }
}

impl From<reqwest::Error> for FaydaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}
