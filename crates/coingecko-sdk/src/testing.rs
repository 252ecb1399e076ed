//! Test doubles for endpoints and sleeping
//!
//! Allows exercising queueing, pagination and retry behavior without network
//! access or wall-clock waits.
//!
//! # Example
//!
//! ```
//! use coingecko_sdk::testing::ScriptedEndpoint;
//! use coingecko_types::InvokeError;
//!
//! let endpoint = ScriptedEndpoint::new("ping");
//! endpoint.push_error(InvokeError::http(429, "https://api.coingecko.com/api/v3/ping"));
//! endpoint.push_ok(serde_json::json!({"gecko_says": "(V3) To the Moon!"}));
//! ```

use crate::retry::Sleeper;
use async_trait::async_trait;
use coingecko_types::{
    CallArgs, Endpoint, InvokeError, Payload, ResponseMeta, Value, PER_PAGE_HEADER, TOTAL_HEADER,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::time::Duration;

type Responder = Box<dyn Fn(&CallArgs) -> Result<Payload, InvokeError> + Send + Sync>;

/// Arguments captured from one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Arguments the endpoint was invoked with
    pub args: CallArgs,
    /// Whether response metadata was requested
    pub include_meta: bool,
}

/// Endpoint that replays scripted outcomes and records every invocation
///
/// Scripted outcomes are consumed in order; once exhausted the responder
/// (if any) answers, otherwise a body of `{"operation": name, "page": page}`.
pub struct ScriptedEndpoint {
    name: String,
    script: Mutex<VecDeque<Result<Payload, InvokeError>>>,
    responder: Option<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedEndpoint {
    /// Create an endpoint with an empty script
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Endpoint answering every page with `{"page": n}` and pagination headers
    pub fn paginated(name: impl Into<String>, per_page: u64, total: u64) -> Self {
        Self::new(name).with_responder(move |args| {
            let meta = ResponseMeta::new(200)
                .with_header(PER_PAGE_HEADER, per_page.to_string())
                .with_header(TOTAL_HEADER, total.to_string());
            Ok(Payload::with_meta(json!({ "page": args.page_number() }), meta))
        })
    }

    /// Answer unscripted invocations with `f`
    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Payload, InvokeError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(f));
        self
    }

    /// Script a successful body
    pub fn push_ok(&self, body: Value) {
        self.script.lock().push_back(Ok(Payload::body(body)));
    }

    /// Script a successful body with response metadata
    pub fn push_ok_with_meta(&self, body: Value, meta: ResponseMeta) {
        self.script.lock().push_back(Ok(Payload::with_meta(body, meta)));
    }

    /// Script an HTTP failure status
    pub fn push_status(&self, status: u16) {
        self.push_error(InvokeError::http(status, format!("https://mock/{}", self.name)));
    }

    /// Script `count` rate-limited answers
    pub fn push_rate_limited(&self, count: usize) {
        for _ in 0..count {
            self.push_status(coingecko_types::RATE_LIMIT_STATUS_CODE);
        }
    }

    /// Script an arbitrary failure
    pub fn push_error(&self, error: InvokeError) {
        self.script.lock().push_back(Err(error));
    }

    /// Every invocation so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Pages requested so far, in order
    pub fn pages(&self) -> Vec<Option<u64>> {
        self.calls.lock().iter().map(|c| c.args.page_number()).collect()
    }
}

#[async_trait]
impl Endpoint for ScriptedEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, args: &CallArgs, include_meta: bool) -> Result<Payload, InvokeError> {
        self.calls.lock().push(RecordedCall {
            args: args.clone(),
            include_meta,
        });

        let scripted = self.script.lock().pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None => match &self.responder {
                Some(responder) => responder(args),
                None => Ok(Payload::body(json!({
                    "operation": self.name,
                    "page": args.page_number(),
                }))),
            },
        };

        outcome.map(|payload| match (include_meta, payload.meta) {
            (false, _) => Payload::body(payload.body),
            (true, Some(meta)) => Payload::with_meta(payload.body, meta),
            (true, None) => Payload::with_meta(payload.body, ResponseMeta::new(200)),
        })
    }
}

impl std::fmt::Debug for ScriptedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedEndpoint")
            .field("name", &self.name)
            .field("scripted", &self.script.lock().len())
            .field("calls", &self.call_count())
            .finish()
    }
}

/// Sleeper that records requested durations and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested sleep durations, in order
    pub fn durations(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    /// Number of sleeps requested
    pub fn count(&self) -> usize {
        self.slept.lock().len()
    }

    /// Sum of all requested durations
    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_default() {
        let endpoint = ScriptedEndpoint::new("ping");
        endpoint.push_status(500);

        let first = endpoint.invoke(&CallArgs::new(), false).await;
        assert_eq!(first.unwrap_err().status(), Some(500));

        let second = endpoint.invoke(&CallArgs::new().page(2), false).await.unwrap();
        assert_eq!(second.body["page"], 2);
        assert!(second.meta.is_none());
        assert_eq!(endpoint.call_count(), 2);
    }

    #[tokio::test]
    async fn test_paginated_headers() {
        let endpoint = ScriptedEndpoint::paginated("coins_markets", 5, 19);

        let payload = endpoint.invoke(&CallArgs::new().page(1), true).await.unwrap();
        let meta = payload.meta.unwrap();
        assert_eq!(meta.header_u64(PER_PAGE_HEADER), Ok(5));
        assert_eq!(meta.header_u64(TOTAL_HEADER), Ok(19));

        let payload = endpoint.invoke(&CallArgs::new().page(2), false).await.unwrap();
        assert!(payload.meta.is_none());
        assert_eq!(endpoint.pages(), vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(1)).await;
        sleeper.sleep(Duration::from_secs(2)).await;

        assert_eq!(sleeper.count(), 2);
        assert_eq!(sleeper.total(), Duration::from_secs(3));
    }
}
