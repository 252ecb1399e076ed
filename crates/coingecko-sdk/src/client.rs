//! High-level CoinGecko client

use crate::batch::{BatchRunner, BatchState};
use crate::builder::CoinGeckoClientBuilder;
use crate::error::{GeckoError, GeckoResult};
use crate::hooks::Hooks;
use crate::pagination::PageRangeError;
use crate::queue::QueuedCall;
use crate::results::BatchResults;
use coingecko_types::{CallArgs, Endpoint, Value, PAGE_END, PAGE_START};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// An endpoint bound to an operation name
#[derive(Clone)]
pub(crate) struct RegisteredOperation {
    endpoint: Arc<dyn Endpoint>,
    paginated: bool,
}

impl RegisteredOperation {
    pub(crate) fn new(endpoint: Arc<dyn Endpoint>, paginated: bool) -> Self {
        Self {
            endpoint,
            paginated,
        }
    }
}

/// Client for the CoinGecko API with call queueing
///
/// A call without a `qid` runs immediately. A call with a `qid` is queued
/// and runs, one request at a time, when
/// [`execute_queued`](Self::execute_queued) drains the batch. Paginated
/// operations accept `page_start` and optionally `page_end` on queued calls
/// and return one result per page.
///
/// Rate-limited requests (HTTP 429) are retried with exponential backoff in
/// both modes.
///
/// # Example
///
/// ```no_run
/// use coingecko_sdk::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = CoinGeckoClient::new()?;
///
///     let markets = CallArgs::new().qid("markets").page_start(1).page_end(3);
///     client.coins_markets("usd", markets).await?;
///     client.ping(CallArgs::new().qid("ping")).await?;
///
///     let results = client.execute_queued().await?;
///     println!("{} market pages", results.pages("markets").map_or(0, |p| p.len()));
///     Ok(())
/// }
/// ```
pub struct CoinGeckoClient {
    operations: HashMap<String, RegisteredOperation>,
    runner: BatchRunner,
    hooks: Hooks,
    state: BatchState,
}

impl CoinGeckoClient {
    /// Create a client with the default configuration
    pub fn new() -> GeckoResult<Self> {
        CoinGeckoClientBuilder::new().build()
    }

    /// Create a new client builder
    pub fn builder() -> CoinGeckoClientBuilder {
        CoinGeckoClientBuilder::new()
    }

    pub(crate) fn from_parts(
        operations: HashMap<String, RegisteredOperation>,
        runner: BatchRunner,
        hooks: Hooks,
    ) -> Self {
        Self {
            operations,
            runner,
            hooks,
            state: BatchState::default(),
        }
    }

    /// Call an operation by name
    ///
    /// With a `qid` in `args` the call is queued and `Ok(None)` is returned.
    /// Without one it runs now and its body is returned. `page_start` and
    /// `page_end` are only accepted on queued calls.
    #[instrument(skip(self, args))]
    pub async fn call(
        &mut self,
        operation: &str,
        mut args: CallArgs,
    ) -> GeckoResult<Option<Value>> {
        let registered = self
            .operations
            .get(operation)
            .cloned()
            .ok_or_else(|| GeckoError::UnknownOperation(operation.to_string()))?;

        match args.take_qid() {
            Some(qid) => {
                self.state.enqueue(
                    &qid,
                    registered.endpoint,
                    args,
                    registered.paginated,
                    &self.hooks,
                )?;
                Ok(None)
            }
            None => {
                let has_range = [PAGE_START, PAGE_END]
                    .iter()
                    .any(|name| args.get(name).map_or(false, |v| !v.is_null()));
                if has_range {
                    return Err(PageRangeError::RequiresQid.into());
                }

                let call = QueuedCall::new(registered.endpoint, args);
                let payload = self.runner.executor().execute(&call, false).await?;
                Ok(Some(payload.body))
            }
        }
    }

    /// Execute every queued call and return results keyed by qid
    ///
    /// The queue is emptied before anything runs, so it is empty afterwards
    /// whether the batch succeeds or fails. A failed batch returns no partial
    /// results; its calls must be queued again.
    pub async fn execute_queued(&mut self) -> GeckoResult<BatchResults> {
        let state = std::mem::take(&mut self.state);
        debug!("Resetting state");
        self.runner.drain(state).await
    }

    /// Number of calls currently queued
    pub fn queued_calls(&self) -> usize {
        self.state.len()
    }

    /// Batch queued since the last drain
    pub fn batch(&self) -> &BatchState {
        &self.state
    }

    /// Check if an operation is registered
    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    /// Check if an operation accepts page ranges
    pub fn is_paginated(&self, operation: &str) -> bool {
        self.operations
            .get(operation)
            .map_or(false, |op| op.paginated)
    }

    /// Registered operation names, sorted
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ========== Convenience Methods ==========

    /// Check API server status
    pub async fn ping(&mut self, args: CallArgs) -> GeckoResult<Option<Value>> {
        self.call("ping", args).await
    }

    /// Current price of coins in the given currencies
    pub async fn simple_price(
        &mut self,
        ids: &[&str],
        vs_currencies: &[&str],
        args: CallArgs,
    ) -> GeckoResult<Option<Value>> {
        let base = CallArgs::new()
            .kwarg("ids", ids.join(","))
            .kwarg("vs_currencies", vs_currencies.join(","));
        self.call("simple_price", base.merge(args)).await
    }

    /// All supported coins with id, name and symbol
    pub async fn coins_list(&mut self, args: CallArgs) -> GeckoResult<Option<Value>> {
        self.call("coins_list", args).await
    }

    /// Market data for coins, priced in `vs_currency`
    pub async fn coins_markets(
        &mut self,
        vs_currency: &str,
        args: CallArgs,
    ) -> GeckoResult<Option<Value>> {
        let base = CallArgs::new().kwarg("vs_currency", vs_currency);
        self.call("coins_markets", base.merge(args)).await
    }

    /// Exchange tickers of one coin
    pub async fn coin_tickers(&mut self, id: &str, args: CallArgs) -> GeckoResult<Option<Value>> {
        self.call("coins_id_tickers", CallArgs::new().arg(id).merge(args))
            .await
    }

    /// All exchanges with data
    pub async fn exchanges(&mut self, args: CallArgs) -> GeckoResult<Option<Value>> {
        self.call("exchanges", args).await
    }
}

impl fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("operations", &self.operations.len())
            .field("runner", &self.runner)
            .field("queued_calls", &self.state.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSleeper, ScriptedEndpoint};
    use serde_json::json;

    fn client_with(endpoint: Arc<ScriptedEndpoint>, paginated: bool) -> CoinGeckoClient {
        CoinGeckoClient::builder()
            .without_registry()
            .with_sleeper(Arc::new(RecordingSleeper::new()))
            .with_endpoint(endpoint.name().to_string(), endpoint, paginated)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_immediate_call() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        endpoint.push_ok(json!({"gecko_says": "(V3) To the Moon!"}));
        let mut client = client_with(endpoint.clone(), false);

        let value = client.ping(CallArgs::new()).await.unwrap();
        assert_eq!(value, Some(json!({"gecko_says": "(V3) To the Moon!"})));
        assert_eq!(client.queued_calls(), 0);
    }

    #[tokio::test]
    async fn test_queued_call_returns_none() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        let mut client = client_with(endpoint.clone(), false);

        let value = client.ping(CallArgs::new().qid("p")).await.unwrap();
        assert!(value.is_none());
        assert_eq!(client.queued_calls(), 1);
        assert_eq!(endpoint.call_count(), 0);
    }

    #[tokio::test]
    async fn test_qid_is_not_sent() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        let mut client = client_with(endpoint.clone(), false);

        client.ping(CallArgs::new().qid("p")).await.unwrap();
        client.execute_queued().await.unwrap();

        assert!(endpoint.calls()[0].args.get("qid").is_none());
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let mut client = client_with(Arc::new(ScriptedEndpoint::new("ping")), false);
        let err = client.call("nope", CallArgs::new()).await.unwrap_err();
        assert!(matches!(err, GeckoError::UnknownOperation(ref name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_page_range_requires_qid() {
        let endpoint = Arc::new(ScriptedEndpoint::new("coins_markets"));
        let mut client = client_with(endpoint.clone(), true);

        let err = client
            .call("coins_markets", CallArgs::new().page_start(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GeckoError::PageRange(PageRangeError::RequiresQid)));
        assert_eq!(endpoint.call_count(), 0);
    }

    #[tokio::test]
    async fn test_convenience_args() {
        let endpoint = Arc::new(ScriptedEndpoint::new("simple_price"));
        let mut client = client_with(endpoint.clone(), false);

        client
            .simple_price(&["bitcoin", "ethereum"], &["usd"], CallArgs::new())
            .await
            .unwrap();

        let args = &endpoint.calls()[0].args;
        assert_eq!(args.get("ids"), Some(&json!("bitcoin,ethereum")));
        assert_eq!(args.get("vs_currencies"), Some(&json!("usd")));
    }
}
