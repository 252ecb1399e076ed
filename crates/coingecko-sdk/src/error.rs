//! Error types for the CoinGecko SDK

use crate::builder::ConfigError;
use crate::pagination::PageRangeError;
use coingecko_rest::RestError;
use coingecko_types::InvokeError;
use thiserror::Error;

/// Main error type for SDK operations
///
/// Every variant is final by the time the caller sees it: rate-limited
/// requests have already been retried, everything else is never retried.
#[derive(Error, Debug)]
pub enum GeckoError {
    // === Validation Errors ===
    /// Page range arguments were misused
    #[error(transparent)]
    PageRange(#[from] PageRangeError),

    /// Operation name is not registered
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    // === Request Errors ===
    /// A single request failed (connection, non-429 HTTP status, decoding)
    #[error(transparent)]
    Request(#[from] InvokeError),

    /// Still rate limited after every allowed attempt
    #[error(
        "Waited for maximum specified time but was still rate limited \
         ({operation}, {attempts} attempts). Try increasing exp_limit."
    )]
    RateLimitExhausted {
        /// Operation that was being called
        operation: String,
        /// Attempts made, including the first
        attempts: u32,
    },

    // === Pagination Errors ===
    /// A page range query's first response did not carry usable
    /// `Per-Page`/`Total` headers
    #[error("page range query {qid}: {message}")]
    PaginationHeaders { qid: String, message: String },

    // === Internal Errors ===
    /// Queue bookkeeping reached a state that should be impossible
    #[error("Implementation error: {0}")]
    Internal(String),

    // === Setup Errors ===
    /// Client configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// REST client could not be created
    #[error(transparent)]
    Rest(#[from] RestError),
}

impl GeckoError {
    /// HTTP status code of a failed request, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(err) => err.status(),
            _ => None,
        }
    }

    /// Returns true if this error stems from server-side rate limiting
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimitExhausted { .. } => true,
            Self::Request(err) => err.is_rate_limit(),
            _ => false,
        }
    }

    /// Returns true if the request never reached the HTTP layer
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Request(err) if err.is_connectivity())
    }

    /// Returns true if the caller's arguments were rejected before any request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::PageRange(_)
                | Self::UnknownOperation(_)
                | Self::Request(InvokeError::InvalidRequest(_))
        )
    }
}

/// Result type for SDK operations
pub type GeckoResult<T> = Result<T, GeckoError>;
