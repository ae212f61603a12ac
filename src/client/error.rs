//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors talking to an alarm-scheduler server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not what the endpoint promises.
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// The server answered with a problem-details error.
    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The alarm service behind the server is not running.
    #[error("alarm service not ready (status {status})")]
    NotReady { status: u16 },
}
