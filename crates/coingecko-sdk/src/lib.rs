//! High-level SDK for the CoinGecko API
//!
//! This crate lets a caller issue many independent API calls, queue them
//! under caller-chosen identifiers, and run them as one batch. It handles
//! page range expansion, rate-limit backoff and result collection; requests
//! run one at a time so the public API's rate limits are respected.
//!
//! # Quick Start
//!
//! ```no_run
//! use coingecko_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = CoinGeckoClient::builder()
//!         .with_exp_limit(6)
//!         .with_log_level(tracing::Level::INFO)
//!         .build()?;
//!
//!     // Runs immediately
//!     let status = client.ping(CallArgs::new()).await?;
//!     println!("{:?}", status);
//!
//!     // Queued: every market page from 1 on, page count read from headers
//!     client.coins_markets("usd", CallArgs::new().qid("markets").page_start(1)).await?;
//!     client.exchanges(CallArgs::new().qid("exchanges").page(1)).await?;
//!
//!     let results = client.execute_queued().await?;
//!     for page in results.pages("markets").unwrap_or_default() {
//!         println!("{} coins", page.as_array().map_or(0, Vec::len));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Call Queueing**: Calls tagged with a `qid` are deferred and run as a batch
//! - **Page Ranges**: `page_start`/`page_end` expand into one call per page;
//!   an open range reads `Per-Page` and `Total` headers to find its end
//! - **Rate-Limit Backoff**: HTTP 429 answers are retried with exponential backoff
//! - **Guaranteed Reset**: The queue is empty after every batch, even a failed one
//! - **Hooks**: Progress, rate limiting, duplicate qids and resolved page ranges

pub mod backoff;
pub mod batch;
pub mod builder;
pub mod client;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod pagination;
pub mod prelude;
pub mod queue;
pub mod results;
pub mod retry;
pub mod testing;

// Re-export main types
pub use builder::{CoinGeckoClientBuilder, ConfigError};
pub use client::CoinGeckoClient;
pub use error::{GeckoError, GeckoResult};
pub use results::{BatchResults, QueryResult};

// Re-export commonly used types from dependencies
pub use coingecko_rest::ClientConfig;
pub use coingecko_types::{CallArgs, Endpoint, InvokeError, Payload, ResponseMeta, Value};
