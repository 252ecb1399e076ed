//! Errors raised by a single endpoint invocation

use serde_json::Value;
use thiserror::Error;

/// HTTP status code the API uses to signal rate limiting
pub const RATE_LIMIT_STATUS_CODE: u16 = 429;

/// Failure of one endpoint invocation
///
/// The variants follow the layers a request passes through: the connection,
/// the HTTP status, and finally decoding of the body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    // === Connection Errors ===
    /// Failure below the HTTP layer (DNS, refused connection, timeout)
    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    // === HTTP Errors ===
    /// The server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        url: String,
        /// Error body returned by the API, when it was valid JSON
        body: Option<Value>,
    },

    // === Decode Errors ===
    /// Response body was not valid UTF-8
    #[error("Unable to decode bytes to utf-8 string (from {url})")]
    DecodeBytes { url: String },

    /// Response body was not valid JSON
    #[error("Unable to decode json from string (from {url}): {message}")]
    DecodeJson { url: String, message: String },

    // === Request Errors ===
    /// The request could not be built from the supplied arguments
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl InvokeError {
    /// Create an HTTP error without a body
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
            body: None,
        }
    }

    /// Create a connection error
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, for HTTP-level failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the server rate limited this request
    pub fn is_rate_limit(&self) -> bool {
        self.status() == Some(RATE_LIMIT_STATUS_CODE)
    }

    /// Returns true if the request never got an HTTP answer
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns true if the transport succeeded but the content was unusable
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::DecodeBytes { .. } | Self::DecodeJson { .. })
    }
}
