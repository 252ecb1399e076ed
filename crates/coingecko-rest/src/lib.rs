//! HTTP endpoint invoker for the CoinGecko v3 API
//!
//! This crate performs single GET requests against the public CoinGecko API
//! and knows which operations exist and which of them are paginated. It does
//! no retrying and no queueing; that is the job of `coingecko-sdk`.
//!
//! # Features
//!
//! - **Registry**: Static table of every public v3 GET operation
//! - **URL Materialization**: Path templates filled from positional arguments
//! - **Typed Failures**: Connection, HTTP status and decode errors kept apart
//! - **Metadata on Demand**: Status and headers returned only when asked for
//!
//! # Example
//!
//! ```no_run
//! use coingecko_rest::{GeckoRestClient, RestEndpoint};
//! use coingecko_types::{CallArgs, Endpoint};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(GeckoRestClient::new()?);
//!     let markets = RestEndpoint::for_operation(client, "coins_markets")
//!         .expect("registered operation");
//!
//!     let args = CallArgs::new().arg("usd").page(1);
//!     let payload = markets.invoke(&args, true).await?;
//!     println!("{}", payload.body);
//!     Ok(())
//! }
//! ```
//!
//! # Pagination
//!
//! An operation is pagination-capable when it accepts both `page` and
//! `per_page`. Those operations answer with `Per-Page` and `Total` headers,
//! which the SDK reads to discover how many pages a query spans.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod url;

// Re-export main types
pub use client::{ClientConfig, GeckoRestClient};
pub use endpoints::registry::{
    find_operation, operation_names, paginated_operation_names, OperationSpec, OPERATIONS,
};
pub use endpoints::RestEndpoint;
pub use error::{RestError, RestResult};
pub use url::materialize_url;
