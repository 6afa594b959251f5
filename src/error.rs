//! Error handler for the SKAS connector.

use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Errors surfaced to the host by the connector.
///
/// A rejected password is not an error: it is reported as
/// [`LoginOutcome::InvalidPassword`](crate::LoginOutcome::InvalidPassword).
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("error on configuring login provider: {0}")]
    Configuration(#[source] ClientError),

    #[error("error on exchange on {path}: {source}")]
    Exchange {
        path: &'static str,
        #[source]
        source: ClientError,
    },
}

/// Errors raised by a remote authentication client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid login provider configuration: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("URL is invalid: {0}")]
    Url(#[from] url::ParseError),

    #[error("unable to read root CA: {0}")]
    Io(#[from] std::io::Error),

    #[error("root CA data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid status code: {status} ({message})")]
    Status { status: u16, message: String },

    #[error("unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("exchange cancelled")]
    Cancelled,
}
