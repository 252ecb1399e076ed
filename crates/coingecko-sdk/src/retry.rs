//! Rate-limit aware execution of single calls
//!
//! Every request the engine makes goes through [`RetryExecutor::execute`].
//! Only HTTP 429 answers are retried; connection failures, other HTTP
//! statuses and decode failures are returned immediately.

use crate::backoff::BackoffConfig;
use crate::error::{GeckoError, GeckoResult};
use crate::hooks::Hooks;
use crate::queue::QueuedCall;
use async_trait::async_trait;
use coingecko_types::{InvokeError, Payload};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Seam for the backoff sleep
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Outcome of a single attempt
#[derive(Debug)]
pub enum Attempt {
    /// The request succeeded
    Success(Payload),
    /// The server answered 429; another attempt may succeed
    RateLimited(InvokeError),
    /// Any other failure; retrying will not help
    Fatal(InvokeError),
}

impl Attempt {
    /// Classify the result of one invocation
    pub fn classify(result: Result<Payload, InvokeError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(err) if err.is_rate_limit() => Self::RateLimited(err),
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Executes calls with exponential backoff on rate limiting
#[derive(Clone)]
pub struct RetryExecutor {
    backoff: BackoffConfig,
    sleeper: Arc<dyn Sleeper>,
    hooks: Hooks,
}

impl RetryExecutor {
    pub fn new(backoff: BackoffConfig, sleeper: Arc<dyn Sleeper>, hooks: Hooks) -> Self {
        Self {
            backoff,
            sleeper,
            hooks,
        }
    }

    /// Backoff settings in use
    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// Make one attempt
    pub async fn attempt(&self, call: &QueuedCall, include_meta: bool) -> Attempt {
        Attempt::classify(call.endpoint.invoke(&call.args, include_meta).await)
    }

    /// Execute `call`, retrying while rate limited
    ///
    /// Makes at most `exp_limit + 1` attempts, sleeping
    /// `delay_for_attempt(n)` between the n-th and (n+1)-th. Returns
    /// [`GeckoError::RateLimitExhausted`] if the last attempt is still
    /// rate limited.
    #[instrument(skip(self, call), fields(operation = call.operation(), page = ?call.page()))]
    pub async fn execute(&self, call: &QueuedCall, include_meta: bool) -> GeckoResult<Payload> {
        let max_attempts = self.backoff.max_attempts();
        let mut attempts: u32 = 0;

        loop {
            match self.attempt(call, include_meta).await {
                Attempt::Success(payload) => return Ok(payload),
                Attempt::Fatal(err) => return Err(GeckoError::Request(err)),
                Attempt::RateLimited(_) => {
                    attempts += 1;
                    if attempts >= max_attempts {
                        warn!(
                            "Still rate limited after {} attempts for {}",
                            attempts,
                            call.operation()
                        );
                        return Err(GeckoError::RateLimitExhausted {
                            operation: call.operation().to_string(),
                            attempts,
                        });
                    }

                    let delay = self.backoff.delay_with_jitter(attempts - 1);
                    info!("Rate limited: sleeping {:?}", delay);
                    self.hooks.emit_rate_limited(attempts, delay);
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("backoff", &self.backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSleeper, ScriptedEndpoint};
    use coingecko_types::CallArgs;
    use serde_json::json;

    fn executor(exp_limit: u32, sleeper: Arc<RecordingSleeper>) -> RetryExecutor {
        RetryExecutor::new(
            BackoffConfig::new().with_exp_limit(exp_limit),
            sleeper,
            Hooks::new(),
        )
    }

    #[tokio::test]
    async fn test_success_after_rate_limiting() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        endpoint.push_rate_limited(3);
        endpoint.push_ok(json!({"gecko_says": "(V3) To the Moon!"}));

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new());
        let payload = executor(8, sleeper.clone()).execute(&call, false).await.unwrap();

        assert_eq!(payload.body["gecko_says"], "(V3) To the Moon!");
        assert_eq!(endpoint.call_count(), 4);
        assert_eq!(
            sleeper.durations(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        endpoint.push_rate_limited(10);

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new());
        let err = executor(3, sleeper.clone()).execute(&call, false).await.unwrap_err();

        assert!(matches!(err, GeckoError::RateLimitExhausted { attempts: 4, .. }));
        assert_eq!(endpoint.call_count(), 4);
        assert_eq!(sleeper.count(), 3);
    }

    #[tokio::test]
    async fn test_fatal_not_retried() {
        let endpoint = Arc::new(ScriptedEndpoint::new("coins_id"));
        endpoint.push_status(404);

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new().arg("nope"));
        let err = executor(8, sleeper.clone()).execute(&call, false).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(endpoint.call_count(), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_connection_error_not_retried() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        endpoint.push_error(InvokeError::connection("https://mock/ping", "connection refused"));

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new());
        let err = executor(8, sleeper.clone()).execute(&call, false).await.unwrap_err();

        assert!(err.is_connectivity());
        assert_eq!(endpoint.call_count(), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_decode_error_not_retried() {
        let endpoint = Arc::new(ScriptedEndpoint::new("coins_list"));
        endpoint.push_error(InvokeError::DecodeJson {
            url: "https://mock/coins/list".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        });
        endpoint.push_ok(json!([]));

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new());
        let err = executor(8, sleeper.clone()).execute(&call, false).await.unwrap_err();

        assert!(matches!(err, GeckoError::Request(InvokeError::DecodeJson { .. })));
        assert!(!err.is_rate_limit());
        assert_eq!(endpoint.call_count(), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_zero_exp_limit_single_attempt() {
        let endpoint = Arc::new(ScriptedEndpoint::new("ping"));
        endpoint.push_rate_limited(1);

        let sleeper = Arc::new(RecordingSleeper::new());
        let call = QueuedCall::new(endpoint.clone(), CallArgs::new());
        let err = executor(0, sleeper.clone()).execute(&call, false).await.unwrap_err();

        assert!(err.is_rate_limit());
        assert_eq!(endpoint.call_count(), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            Attempt::classify(Err(InvokeError::http(429, "u"))),
            Attempt::RateLimited(_)
        ));
        assert!(matches!(
            Attempt::classify(Err(InvokeError::http(503, "u"))),
            Attempt::Fatal(_)
        ));
        assert!(matches!(
            Attempt::classify(Ok(Payload::body(json!(null)))),
            Attempt::Success(_)
        ));
    }
}
