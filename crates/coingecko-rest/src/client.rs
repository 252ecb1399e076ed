//! Main REST client implementation

use crate::error::{self, RestError, RestResult};
use coingecko_types::{InvokeError, Payload, ResponseMeta, Value};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Public CoinGecko API root
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// CoinGecko REST client
///
/// Performs exactly one GET per call and classifies the outcome. Cloning is
/// cheap; the connection pool is shared.
///
/// # Example
///
/// ```no_run
/// use coingecko_rest::GeckoRestClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = GeckoRestClient::new()?;
///     let url = client.base_url().join("v3/ping")?;
///     let payload = client.get(url, false).await?;
///     println!("{}", payload.body);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GeckoRestClient {
    http_client: Client,
    base_url: Url,
}

impl GeckoRestClient {
    /// Create a new client with the default configuration
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| RestError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RestError::InvalidBaseUrl {
                url: config.base_url,
                message: "URL cannot be used as a base".to_string(),
            });
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_deref().unwrap_or("coingecko-rest/0.1.0"))
            .build()?;

        info!("Created CoinGecko REST client for {}", base_url);

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// API root every operation path is appended to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Perform one GET request and decode its JSON body
    ///
    /// Non-2xx statuses become [`InvokeError::Http`], even when the error
    /// body cannot be read. Failures before any status was received become
    /// [`InvokeError::Connection`]. The response
    /// metadata is attached only when `include_meta` is set.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get(&self, url: Url, include_meta: bool) -> Result<Payload, InvokeError> {
        debug!("https request: {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| error::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        let mut meta = ResponseMeta::new(status.as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                meta.insert_header(name.as_str(), value);
            }
        }

        if !status.is_success() {
            info!("https response had failure status code: {}", status.as_u16());
            // the status alone classifies the failure; a lost body does not change it
            let body = response.bytes().await.ok().and_then(|bytes| {
                std::str::from_utf8(&bytes)
                    .ok()
                    .and_then(|text| serde_json::from_str::<Value>(text).ok())
            });
            return Err(InvokeError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| error::from_reqwest(url.as_str(), e))?;

        let body = decode_body(url.as_str(), &bytes)?;

        if include_meta {
            Ok(Payload::with_meta(body, meta))
        } else {
            Ok(Payload::body(body))
        }
    }
}

/// Decode a response body as UTF-8 JSON
fn decode_body(url: &str, bytes: &[u8]) -> Result<Value, InvokeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| InvokeError::DecodeBytes {
        url: url.to_string(),
    })?;
    serde_json::from_str(text).map_err(|e| InvokeError::DecodeJson {
        url: url.to_string(),
        message: e.to_string(),
    })
}

impl std::fmt::Debug for GeckoRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeckoRestClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (scheme, host and base path)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(60)
            .with_user_agent("test-agent");

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ClientConfig::default().timeout_secs, 120);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GeckoRestClient::with_config(ClientConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(RestError::InvalidBaseUrl { .. })));

        let result =
            GeckoRestClient::with_config(ClientConfig::new().with_base_url("mailto:x@y.z"));
        assert!(matches!(result, Err(RestError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body("u", br#"{"a":1}"#).unwrap()["a"], 1);
        assert!(matches!(
            decode_body("u", &[0xff, 0xfe]),
            Err(InvokeError::DecodeBytes { .. })
        ));
        assert!(matches!(
            decode_body("u", b"<html>"),
            Err(InvokeError::DecodeJson { .. })
        ));
    }

    /// Serve one raw HTTP response on a local port and return its URL
    async fn serve_once(response: &'static [u8]) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(response).await.unwrap();
            // closing here cuts the body short
        });
        Url::parse(&format!("http://{}/api/v3/ping", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_truncated_rate_limit_body_keeps_status() {
        let url = serve_once(
            b"HTTP/1.1 429 Too Many Requests\r\n\
              Content-Length: 100\r\n\
              Connection: close\r\n\r\nhello",
        )
        .await;
        let client = GeckoRestClient::with_config(ClientConfig::new().with_timeout(5)).unwrap();

        let err = client.get(url, false).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(err.is_rate_limit());
        assert!(!err.is_connectivity());
        assert!(matches!(err, InvokeError::Http { body: None, .. }));
    }

    #[tokio::test]
    async fn test_error_body_is_kept() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\n\
              Content-Type: application/json\r\n\
              Content-Length: 26\r\n\
              Connection: close\r\n\r\n\
              {\"error\":\"coin not found\"}",
        )
        .await;
        let client = GeckoRestClient::with_config(ClientConfig::new().with_timeout(5)).unwrap();

        let err = client.get(url, false).await.unwrap_err();
        match err {
            InvokeError::Http { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body.unwrap()["error"], "coin not found");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_connectivity_error() {
        let client = GeckoRestClient::with_config(
            ClientConfig::new()
                .with_base_url("http://127.0.0.1:9/api/v3")
                .with_timeout(5),
        )
        .unwrap();
        let url = Url::parse("http://127.0.0.1:9/api/v3/ping").unwrap();

        let err = client.get(url, false).await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
