//! Error types for event stream operations

use thiserror::Error;

/// In-band stream status code meaning the upstream canceled its
/// internal subscription bookkeeping; the connection itself is fine.
pub const CODE_CANCELED: u32 = 1;

/// In-band stream status code meaning the upstream considers the
/// connection dead.
pub const CODE_UNAVAILABLE: u32 = 14;

/// Errors from the REST side of the API (discovery)
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid server URL
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API key cannot be carried in an Authorization header
    #[error("API key is not a valid header value")]
    InvalidApiKey,

    /// Server rejected the request
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

/// Errors from a live event stream.
///
/// The classification drives the consumer's resilience contract:
/// `Canceled` is absorbed on the same session, the `Unavailable` class
/// (including a closed stream and mid-stream transport drops) triggers
/// reconnection, everything else is fatal.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Upstream canceled its internal stream bookkeeping (in-band
    /// status code 1); receive can simply be retried.
    #[error("stream receive canceled")]
    Canceled,

    /// The connection is presumed dead (in-band status code 14 or a
    /// transport failure while reading the stream body).
    #[error("stream unavailable: {0}")]
    Unavailable(String),

    /// The server ended the stream; for an endless event stream this
    /// means the connection was lost.
    #[error("stream closed by server")]
    Closed,

    /// Connecting the stream failed
    #[error("connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The stream endpoint URL could not be built
    #[error("invalid stream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server rejected the stream request
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// An in-band stream status not covered by the classes above
    #[error("stream status {code}: {message}")]
    Status { code: u32, message: String },
}

impl StreamError {
    /// Build the error for an in-band status frame
    pub fn from_status(code: u32, message: String) -> Self {
        match code {
            CODE_CANCELED => StreamError::Canceled,
            CODE_UNAVAILABLE => StreamError::Unavailable(message),
            _ => StreamError::Status { code, message },
        }
    }

    /// Benign hiccup: discard and retry `recv` on the same session
    pub fn is_canceled(&self) -> bool {
        matches!(self, StreamError::Canceled)
    }

    /// Dead connection: back off and open a new session
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StreamError::Unavailable(_) | StreamError::Closed)
    }
}
