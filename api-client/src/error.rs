use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for a single API call.
///
/// Cancellation is deliberately absent: a superseded request is not an error
/// and is handled by the fetch slot that issued it, never by the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete at the transport level.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request completed but the server signaled failure.
    #[error("server returned {0}")]
    Status(StatusCode),

    /// The response body does not match the documented shape or violates a
    /// response invariant. Propagates like a failed response.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[source] url::ParseError),
}
