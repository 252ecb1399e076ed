//! API endpoint implementations

pub mod registry;

use crate::client::GeckoRestClient;
use crate::url::materialize_url;
use async_trait::async_trait;
use coingecko_types::{CallArgs, Endpoint, InvokeError, Payload};
use registry::{find_operation, OperationSpec, OPERATIONS};
use std::sync::Arc;
use tracing::instrument;

/// One registered operation bound to a shared REST client
#[derive(Debug, Clone)]
pub struct RestEndpoint {
    client: Arc<GeckoRestClient>,
    spec: &'static OperationSpec,
}

impl RestEndpoint {
    pub fn new(client: Arc<GeckoRestClient>, spec: &'static OperationSpec) -> Self {
        Self { client, spec }
    }

    /// Bind a registered operation by name
    pub fn for_operation(client: Arc<GeckoRestClient>, name: &str) -> Option<Self> {
        find_operation(name).map(|spec| Self::new(client, spec))
    }

    /// Bind every registered operation
    pub fn all(client: Arc<GeckoRestClient>) -> Vec<Self> {
        OPERATIONS
            .iter()
            .map(|spec| Self::new(client.clone(), spec))
            .collect()
    }

    /// Static description of the bound operation
    pub fn spec(&self) -> &'static OperationSpec {
        self.spec
    }
}

#[async_trait]
impl Endpoint for RestEndpoint {
    fn name(&self) -> &str {
        self.spec.name
    }

    #[instrument(skip(self, args), fields(operation = self.spec.name))]
    async fn invoke(&self, args: &CallArgs, include_meta: bool) -> Result<Payload, InvokeError> {
        let url = materialize_url(self.client.base_url(), self.spec, args)?;
        self.client.get(url, include_meta).await
    }
}
