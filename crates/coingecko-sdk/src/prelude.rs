//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use coingecko_sdk::prelude::*;
//! ```

// Client
pub use crate::builder::{CoinGeckoClientBuilder, ConfigError};
pub use crate::client::CoinGeckoClient;

// Errors
pub use crate::error::{GeckoError, GeckoResult};
pub use crate::pagination::PageRangeError;

// Results
pub use crate::results::{BatchResults, QueryResult};

// Retry and observability
pub use crate::backoff::BackoffConfig;
pub use crate::hooks::{Hooks, PageRangeInfo, Progress};
pub use crate::retry::{Sleeper, TokioSleeper};

// Types from coingecko-types
pub use coingecko_types::{CallArgs, Endpoint, InvokeError, Payload, ResponseMeta, Value};

// REST configuration
pub use coingecko_rest::ClientConfig;
