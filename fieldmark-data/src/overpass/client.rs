//! Blocking Overpass client with endpoint fallback.
//!
//! Requests are POSTed as `data=<query>` form bodies. Endpoints are tried in
//! order and the first successful response wins; when every endpoint fails
//! the last error is returned.
//!
//! The client exposes a synchronous interface and drives the asynchronous
//! `reqwest` calls on a Tokio runtime it owns. Inside an existing
//! multi-threaded runtime it borrows that runtime's handle through
//! [`tokio::task::block_in_place`] instead.

use std::time::Duration;

use fieldmark_core::{FeatureCollection, LayerKind};
use log::{debug, info, warn};
use reqwest::{Client, header};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::{BoundingBox, OsmResponse, layer_query, osm_to_features};

/// Public Overpass interpreters tried by default, in order.
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.nchc.org.tw/api/interpreter",
];

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "fieldmark/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors returned by [`OverpassClient`] requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverpassError {
    /// The client was configured without endpoints.
    #[error("no Overpass endpoints configured")]
    NoEndpoints,
    /// The request did not complete in time.
    #[error("Overpass request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The endpoint answered with a non-success status.
    #[error("Overpass HTTP {status} from {url}")]
    Http {
        /// Endpoint URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The endpoint could not be reached.
    #[error("Overpass request to {url} failed: {message}")]
    Network {
        /// Endpoint URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The response body was not valid Overpass JSON.
    #[error("invalid Overpass response from {url}: {message}")]
    Decode {
        /// Endpoint URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
}

/// Errors raised while constructing an [`OverpassClient`].
#[derive(Debug, Error)]
pub enum OverpassBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`OverpassClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassConfig {
    /// Interpreter URLs tried in order.
    pub endpoints: Vec<String>,
    /// Area fetched for each layer.
    pub bbox: BoundingBox,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with requests.
    pub user_agent: String,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|&url| url.to_owned()).collect(),
            bbox: BoundingBox::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassConfig {
    /// Replace the endpoint list.
    #[must_use]
    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the study area.
    #[must_use]
    pub const fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Synchronous Overpass API client.
///
/// # Examples
/// ```no_run
/// use fieldmark_core::LayerKind;
/// use fieldmark_data::overpass::{OverpassClient, OverpassConfig};
///
/// let client = OverpassClient::new(OverpassConfig::default())?;
/// let roads = client.fetch_layer(LayerKind::Roads)?;
/// println!("{} road features", roads.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OverpassClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OverpassClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(config: OverpassConfig) -> Result<Self, OverpassBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OverpassBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(OverpassBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }

    /// Fetch and convert one context layer.
    ///
    /// # Errors
    /// Returns the last endpoint's error when no endpoint succeeds.
    pub fn fetch_layer(&self, kind: LayerKind) -> Result<FeatureCollection, OverpassError> {
        let query = layer_query(kind, &self.config.bbox);
        let response = self.run_query(&query)?;
        let features = osm_to_features(&response);
        info!("fetched {} {kind} features from Overpass", features.len());
        Ok(features)
    }

    /// Run a raw Overpass QL query.
    ///
    /// # Errors
    /// Returns the last endpoint's error when no endpoint succeeds.
    pub fn run_query(&self, query: &str) -> Result<OsmResponse, OverpassError> {
        let future = self.query_with_fallback(query);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn query_with_fallback(&self, query: &str) -> Result<OsmResponse, OverpassError> {
        let body = form_body(query);
        let mut last_error = OverpassError::NoEndpoints;
        for endpoint in &self.config.endpoints {
            match self.post(endpoint, body.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    warn!("{err}; trying next endpoint");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    async fn post(&self, url: &str, body: String) -> Result<OsmResponse, OverpassError> {
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .body(body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OverpassError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        let text = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        serde_json::from_str(&text).map_err(|err| OverpassError::Decode {
            url: url.to_owned(),
            message: err.to_string(),
        })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> OverpassError {
        if error.is_timeout() {
            return OverpassError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return OverpassError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        OverpassError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Encode `query` as an `application/x-www-form-urlencoded` body.
fn form_body(query: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", query)
        .finish()
}
