// # DNSimple Zone Record Client
//
// This crate provides the DNSimple implementation of `ZoneRecordApi`.
//
// ## Behavior
//
// - One HTTP request per call
// - Non-2xx answers become `ApiError::Status` carrying the numeric status and
//   the API's `message`, so callers can recognize 404 without reading text
// - HTTP timeout of 30 seconds
// - No retries, no backoff, no caching
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - DNSimple API v2: https://developer.dnsimple.com/v2/zones/records/
// - Create: POST   `/v2/:account/zones/:zone/records`
// - Get:    GET    `/v2/:account/zones/:zone/records/:record`
// - Update: PATCH  `/v2/:account/zones/:zone/records/:record`
// - Delete: DELETE `/v2/:account/zones/:zone/records/:record`

use async_trait::async_trait;
use dnsrec_core::config::ProviderConfig;
use dnsrec_core::record::{ZoneRecord, ZoneRecordAttributes, ZoneRecordUpdate};
use dnsrec_core::traits::{ZoneRecordApi, ZoneRecordApiFactory};
use dnsrec_core::{ApiError, Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Production API base URL
pub const DNSIMPLE_API_BASE: &str = "https://api.dnsimple.com";

/// Sandbox API base URL
pub const DNSIMPLE_SANDBOX_API_BASE: &str = "https://api.sandbox.dnsimple.com";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("dnsrec/", env!("CARGO_PKG_VERSION"));

/// `{"data": ...}` wrapper around every successful response body
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error response body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// DNSimple zone record client
///
/// Stateless apart from the connection pool; one instance can serve any
/// number of accounts and zones.
pub struct DnsimpleClient {
    /// API access token
    /// ⚠️ NEVER log this value
    token: String,

    /// Base URL; request paths are appended as encoded segments
    base_url: reqwest::Url,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DnsimpleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsimpleClient")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url())
            .finish()
    }
}

impl DnsimpleClient {
    /// Create a client against `base_url`
    ///
    /// # Errors
    ///
    /// Fails if the token is empty, the base URL is not a usable HTTP(S)
    /// URL, or the HTTP client cannot be built.
    pub fn new(token: impl Into<String>, base_url: impl AsRef<str>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("DNSimple API token cannot be empty"));
        }

        let base_url = reqwest::Url::parse(base_url.as_ref()).map_err(|e| {
            Error::config(format!("Invalid DNSimple base URL {:?}: {}", base_url.as_ref(), e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "DNSimple base URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            base_url,
            client,
        })
    }

    /// Create a client for the production API
    pub fn production(token: impl Into<String>) -> Result<Self> {
        Self::new(token, DNSIMPLE_API_BASE)
    }

    /// Create a client for the sandbox API
    pub fn sandbox(token: impl Into<String>) -> Result<Self> {
        Self::new(token, DNSIMPLE_SANDBOX_API_BASE)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/v2/{account}/zones/{zone}/records` followed by `extra`
    ///
    /// Account and zone are percent-encoded as single path segments.
    fn endpoint(
        &self,
        account: &str,
        zone: &str,
        extra: Option<&str>,
    ) -> std::result::Result<reqwest::Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::transport("base URL cannot carry a path"))?;
            segments
                .pop_if_empty()
                .extend(["v2", account, "zones", zone, "records"]);
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        Ok(url)
    }

    fn records_url(
        &self,
        account: &str,
        zone: &str,
    ) -> std::result::Result<reqwest::Url, ApiError> {
        self.endpoint(account, zone, None)
    }

    fn record_url(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> std::result::Result<reqwest::Url, ApiError> {
        self.endpoint(account, zone, Some(&record_id.to_string()))
    }

    /// Send a request and return the response if its status is a success
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("no message").to_string()
                } else {
                    text
                }
            });

        tracing::debug!("DNSimple answered {}: {}", status, message);
        Err(ApiError::status(status.as_u16(), message))
    }

    /// Send a request and decode the `data` member of the response
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let response = self.execute(request).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::decode(format!("Failed to parse response: {}", e)))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ZoneRecordApi for DnsimpleClient {
    async fn create_record(
        &self,
        account: &str,
        zone: &str,
        attributes: &ZoneRecordAttributes,
    ) -> std::result::Result<ZoneRecord, ApiError> {
        let url = self.records_url(account, zone)?;
        tracing::debug!("POST {}", url);
        self.execute_json(self.client.post(url).json(attributes))
            .await
    }

    async fn get_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> std::result::Result<ZoneRecord, ApiError> {
        let url = self.record_url(account, zone, record_id)?;
        tracing::debug!("GET {}", url);
        self.execute_json(self.client.get(url)).await
    }

    async fn update_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
        update: &ZoneRecordUpdate,
    ) -> std::result::Result<ZoneRecord, ApiError> {
        let url = self.record_url(account, zone, record_id)?;
        tracing::debug!("PATCH {} fields {:?}", url, update.field_names());
        self.execute_json(self.client.patch(url).json(update))
            .await
    }

    async fn delete_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> std::result::Result<(), ApiError> {
        let url = self.record_url(account, zone, record_id)?;
        tracing::debug!("DELETE {}", url);
        self.execute(self.client.delete(url)).await.map(|_| ())
    }

    fn provider_name(&self) -> &'static str {
        "dnsimple"
    }
}

/// Factory for creating DNSimple clients
pub struct DnsimpleFactory;

impl ZoneRecordApiFactory for DnsimpleFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneRecordApi>> {
        match config {
            ProviderConfig::Dnsimple {
                token,
                sandbox,
                base_url,
                ..
            } => {
                let base_url = match (base_url, sandbox) {
                    (Some(url), _) => url.as_str(),
                    (None, true) => DNSIMPLE_SANDBOX_API_BASE,
                    (None, false) => DNSIMPLE_API_BASE,
                };

                if *sandbox {
                    tracing::info!("DNSimple client using the sandbox environment");
                }

                Ok(Box::new(DnsimpleClient::new(token.clone(), base_url)?))
            }
            _ => Err(Error::config("Invalid config for DNSimple provider")),
        }
    }
}

/// Register the DNSimple provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsrec_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsrec_provider_dnsimple::register(&registry);
/// assert!(registry.has_provider("dnsimple"));
/// ```
pub fn register(registry: &dnsrec_core::ProviderRegistry) {
    registry.register_provider("dnsimple", Box::new(DnsimpleFactory));
}
