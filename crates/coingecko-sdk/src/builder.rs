//! Client Builder Pattern
//!
//! Provides a fluent builder API for configuring the CoinGecko client with
//! sensible defaults and validation.
//!
//! # Example
//!
//! ```
//! use coingecko_sdk::builder::CoinGeckoClientBuilder;
//! use tracing::Level;
//!
//! let builder = CoinGeckoClientBuilder::new()
//!     .with_exp_limit(5)
//!     .with_progress_interval(25)
//!     .with_log_level(Level::INFO);
//! assert!(builder.validate().is_ok());
//! ```

use crate::backoff::BackoffConfig;
use crate::batch::{BatchRunner, DEFAULT_PROGRESS_INTERVAL};
use crate::client::{CoinGeckoClient, RegisteredOperation};
use crate::error::GeckoResult;
use crate::hooks::Hooks;
use crate::logging;
use crate::retry::{RetryExecutor, Sleeper, TokioSleeper};
use coingecko_rest::{ClientConfig, GeckoRestClient, RestEndpoint};
use coingecko_types::Endpoint;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, Level};

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Progress interval outside 1..=100
    #[error("progress interval must be between 1 and 100 percent, got {interval}")]
    InvalidProgressInterval { interval: u32 },

    /// Backoff would not grow
    #[error("backoff multiplier must be a finite number >= 1.0, got {multiplier}")]
    InvalidMultiplier { multiplier: f64 },

    /// Custom endpoint registered without a name
    #[error("operation name must not be empty")]
    EmptyOperationName,
}

/// Builder for configuring a CoinGecko client
///
/// Every registered v3 operation is bound to a shared REST client unless
/// [`without_registry`](Self::without_registry) is used. Endpoints added with
/// [`with_endpoint`](Self::with_endpoint) replace registered ones of the same
/// name.
#[derive(Clone)]
pub struct CoinGeckoClientBuilder {
    /// Retry policy for rate-limited requests
    pub backoff: BackoffConfig,

    /// Progress granularity in percent
    pub progress_interval: u32,

    /// Install a log subscriber at this level on build
    pub log_level: Option<Level>,

    /// HTTP settings for the registry endpoints
    pub rest_config: ClientConfig,

    /// Observability callbacks
    pub hooks: Hooks,

    sleeper: Option<Arc<dyn Sleeper>>,
    endpoints: Vec<(String, Arc<dyn Endpoint>, bool)>,
    use_registry: bool,
}

impl Default for CoinGeckoClientBuilder {
    fn default() -> Self {
        Self {
            backoff: BackoffConfig::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            log_level: None,
            rest_config: ClientConfig::default(),
            hooks: Hooks::default(),
            sleeper: None,
            endpoints: Vec::new(),
            use_registry: true,
        }
    }
}

impl fmt::Debug for CoinGeckoClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let custom: Vec<&str> = self.endpoints.iter().map(|(name, _, _)| name.as_str()).collect();
        f.debug_struct("CoinGeckoClientBuilder")
            .field("backoff", &self.backoff)
            .field("progress_interval", &self.progress_interval)
            .field("log_level", &self.log_level)
            .field("rest_config", &self.rest_config)
            .field("hooks", &self.hooks)
            .field("custom_sleeper", &self.sleeper.is_some())
            .field("custom_endpoints", &custom)
            .field("use_registry", &self.use_registry)
            .finish()
    }
}

impl CoinGeckoClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retries of a rate-limited request
    pub fn with_exp_limit(mut self, exp_limit: u32) -> Self {
        self.backoff.exp_limit = exp_limit;
        self
    }

    /// Set the progress granularity in percent (1 to 100)
    pub fn with_progress_interval(mut self, interval: u32) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Install a fmt log subscriber at `level` when the client is built
    ///
    /// `RUST_LOG` overrides the level. Has no effect if the application has
    /// already installed a global subscriber.
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set HTTP settings (base URL, timeout, user agent)
    pub fn with_rest_config(mut self, config: ClientConfig) -> Self {
        self.rest_config = config;
        self
    }

    /// Replace the whole backoff policy
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sleep with something other than the tokio timer
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Set observability callbacks
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register an endpoint under `name`, replacing any registered one
    ///
    /// `paginated` decides whether calls may use `page_start`/`page_end`.
    pub fn with_endpoint(
        mut self,
        name: impl Into<String>,
        endpoint: Arc<dyn Endpoint>,
        paginated: bool,
    ) -> Self {
        self.endpoints.push((name.into(), endpoint, paginated));
        self
    }

    /// Start from an empty operation table instead of the v3 registry
    pub fn without_registry(mut self) -> Self {
        self.use_registry = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.progress_interval) {
            return Err(ConfigError::InvalidProgressInterval {
                interval: self.progress_interval,
            });
        }

        let multiplier = self.backoff.multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier { multiplier });
        }

        if self.endpoints.iter().any(|(name, _, _)| name.is_empty()) {
            return Err(ConfigError::EmptyOperationName);
        }

        Ok(())
    }

    /// Validate the configuration and create the client
    pub fn build(self) -> GeckoResult<CoinGeckoClient> {
        self.validate()?;

        if let Some(level) = self.log_level {
            logging::init_logging(level);
        }

        let mut operations = HashMap::new();
        if self.use_registry {
            let rest = Arc::new(GeckoRestClient::with_config(self.rest_config)?);
            for endpoint in RestEndpoint::all(rest) {
                let paginated = endpoint.spec().is_paginated();
                let name = endpoint.spec().name.to_string();
                operations.insert(name, RegisteredOperation::new(Arc::new(endpoint), paginated));
            }
        }
        for (name, endpoint, paginated) in self.endpoints {
            debug!(operation = %name, paginated, "Registering custom endpoint");
            operations.insert(name, RegisteredOperation::new(endpoint, paginated));
        }

        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));
        let executor = RetryExecutor::new(self.backoff, sleeper, self.hooks.clone());
        let runner = BatchRunner::new(executor, self.hooks.clone(), self.progress_interval);

        Ok(CoinGeckoClient::from_parts(operations, runner, self.hooks))
    }
}
