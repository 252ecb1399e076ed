//! Common test utilities and fixtures for integration tests
//!
//! Response bodies mirror the shapes returned by the live v3 API.

#![allow(dead_code)]

use coingecko_sdk::hooks::Hooks;
use coingecko_sdk::testing::{RecordingSleeper, ScriptedEndpoint};
use coingecko_sdk::CoinGeckoClient;
use coingecko_types::{ResponseMeta, Value, PER_PAGE_HEADER, TOTAL_HEADER};
use serde_json::json;
use std::sync::Arc;

/// Body of a successful ping
pub fn ping_body() -> Value {
    json!({"gecko_says": "(V3) To the Moon!"})
}

/// Body of a one-coin markets page
pub fn market_row(id: &str, price: f64) -> Value {
    json!([{
        "id": id,
        "symbol": &id[..3],
        "current_price": price,
        "market_cap_rank": 1
    }])
}

/// Metadata carrying the pagination headers
pub fn paging_meta(per_page: u64, total: u64) -> ResponseMeta {
    ResponseMeta::new(200)
        .with_header(PER_PAGE_HEADER, per_page.to_string())
        .with_header(TOTAL_HEADER, total.to_string())
}

/// Client wired to scripted endpoints
pub struct Harness {
    pub client: CoinGeckoClient,
    pub sleeper: Arc<RecordingSleeper>,
}

/// Builds a [`Harness`] around any number of scripted endpoints
pub struct HarnessBuilder {
    endpoints: Vec<(Arc<ScriptedEndpoint>, bool)>,
    exp_limit: u32,
    progress_interval: u32,
    hooks: Hooks,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            exp_limit: 8,
            progress_interval: 10,
            hooks: Hooks::new(),
        }
    }

    pub fn endpoint(mut self, endpoint: &Arc<ScriptedEndpoint>) -> Self {
        self.endpoints.push((endpoint.clone(), false));
        self
    }

    pub fn paginated(mut self, endpoint: &Arc<ScriptedEndpoint>) -> Self {
        self.endpoints.push((endpoint.clone(), true));
        self
    }

    pub fn exp_limit(mut self, exp_limit: u32) -> Self {
        self.exp_limit = exp_limit;
        self
    }

    pub fn progress_interval(mut self, interval: u32) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Harness {
        use coingecko_types::Endpoint;

        let sleeper = Arc::new(RecordingSleeper::new());
        let mut builder = CoinGeckoClient::builder()
            .without_registry()
            .with_exp_limit(self.exp_limit)
            .with_progress_interval(self.progress_interval)
            .with_sleeper(sleeper.clone())
            .with_hooks(self.hooks);
        for (endpoint, paginated) in self.endpoints {
            builder = builder.with_endpoint(endpoint.name().to_string(), endpoint, paginated);
        }

        Harness {
            client: builder.build().expect("valid test configuration"),
            sleeper,
        }
    }
}
