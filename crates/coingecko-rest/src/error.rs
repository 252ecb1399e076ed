//! Error types for REST client construction and reqwest failure mapping

use coingecko_types::InvokeError;

/// Errors that can occur while setting up the REST client
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// The underlying HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// The configured base URL is unusable
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl {
        /// URL as configured
        url: String,
        /// Why it was rejected
        message: String,
    },
}

/// Result type for REST client setup
pub type RestResult<T> = Result<T, RestError>;

/// Map a transport-level reqwest failure to an invocation error
///
/// Only failures that never produced an HTTP status reach this function,
/// so every one of them is a connectivity problem.
pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> InvokeError {
    let message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("could not connect: {}", err)
    } else {
        err.to_string()
    };
    InvokeError::connection(url, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_message() {
        let err = RestError::InvalidBaseUrl {
            url: "not a url".to_string(),
            message: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("not a url"));
    }
}
