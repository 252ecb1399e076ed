//! Endpoint invocation abstraction
//!
//! This module provides the trait the request engine uses to perform one
//! HTTP GET, enabling the queueing and retry logic to be tested without
//! real network calls.

use crate::{CallArgs, InvokeError, Payload};
use async_trait::async_trait;

/// One API operation that can be invoked
///
/// Implementations perform exactly one request per call; retrying is the
/// caller's business.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Operation name (e.g. `coins_markets`)
    fn name(&self) -> &str;

    /// Perform one request
    ///
    /// When `include_meta` is true the returned [`Payload`] must carry the
    /// response metadata (status and headers).
    async fn invoke(&self, args: &CallArgs, include_meta: bool) -> Result<Payload, InvokeError>;
}
