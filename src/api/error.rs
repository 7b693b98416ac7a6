//! Error types for the session-state service client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Convenient result alias returning [`ApiError`] failures.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that can occur while talking to the session-state service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent (connection refused, timeout, DNS).
    #[error("failed to send request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("unexpected response status {status} for `{path}`")]
    RequestStatus {
        path: String,
        status: StatusCode,
        /// Message decoded from the `{error}` body, when one was shipped.
        message: Option<String>,
    },
    /// Response payload could not be parsed.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Error body shipped by the backend on failed requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
