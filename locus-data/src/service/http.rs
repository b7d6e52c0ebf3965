//! HTTP [`FeatureSource`] speaking the Esri-style query protocol.
//!
//! One call issues one batch request. Spatial filtering is expressed as a
//! point geometry with `esriSpatialRelIntersects`, optionally widened by a
//! `distance`/`units=esriSRUnit_Meter` buffer. Transport failures, error
//! statuses and undecodable bodies all map into [`SourceError`] so the
//! fetcher can degrade a pass without aborting the resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::{FeaturePage, FeatureSource, PageQuery, QueryResponse, SourceError, SpatialFilter};

/// Default user agent for feature-service requests.
pub const DEFAULT_USER_AGENT: &str = "locus-engine/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpFeatureSource`].
#[derive(Debug, Clone)]
pub struct HttpFeatureSourceConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpFeatureSourceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpFeatureSourceConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Errors from [`HttpFeatureSource`] construction.
#[derive(Debug, Error)]
pub enum HttpSourceBuildError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// [`FeatureSource`] implementation over HTTP.
#[derive(Debug)]
pub struct HttpFeatureSource {
    client: Client,
    config: HttpFeatureSourceConfig,
}

impl HttpFeatureSource {
    /// Create a source with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpSourceBuildError`] when the HTTP client fails to build.
    pub fn new() -> Result<Self, HttpSourceBuildError> {
        Self::with_config(HttpFeatureSourceConfig::default())
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpSourceBuildError`] when the HTTP client fails to build.
    pub fn with_config(config: HttpFeatureSourceConfig) -> Result<Self, HttpSourceBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Build the query URL for one batch: `{endpoint}/{layer}/query`.
    fn build_query_url(query: &PageQuery) -> Result<Url, SourceError> {
        let base = format!(
            "{}/{}/query",
            query.endpoint.trim_end_matches('/'),
            query.layer_id
        );
        Url::parse(&base).map_err(|err| SourceError::Unavailable {
            url: base.clone(),
            message: format!("invalid endpoint URL: {err}"),
        })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> SourceError {
        let message = if error.is_timeout() {
            format!("timed out after {}s", self.config.timeout.as_secs())
        } else if let Some(status) = error.status() {
            format!("HTTP status {status}")
        } else {
            error.to_string()
        };
        SourceError::Unavailable {
            url: url.to_owned(),
            message,
        }
    }
}

/// Request parameters for one batch, in the service's expected form.
fn request_params(query: &PageQuery) -> Vec<(&'static str, String)> {
    let origin = query.origin;
    let mut params = vec![
        ("f", "json".to_owned()),
        ("where", "1=1".to_owned()),
        ("outFields", "*".to_owned()),
        ("returnGeometry", "true".to_owned()),
        (
            "geometry",
            format!("{},{}", origin.longitude(), origin.latitude()),
        ),
        ("geometryType", "esriGeometryPoint".to_owned()),
        ("inSR", "4326".to_owned()),
        ("spatialRel", "esriSpatialRelIntersects".to_owned()),
        ("resultOffset", query.offset.to_string()),
        ("resultRecordCount", query.page_size.to_string()),
    ];
    if let SpatialFilter::WithinDistance { meters } = query.filter {
        params.push(("distance", meters.to_string()));
        params.push(("units", "esriSRUnit_Meter".to_owned()));
    }
    params
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeaturePage, SourceError> {
        let url = Self::build_query_url(query)?;
        let params = request_params(query);

        let response = self
            .client
            .get(url.clone())
            .query(&params)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        let body: QueryResponse =
            response
                .json()
                .await
                .map_err(|err| SourceError::Malformed {
                    message: err.to_string(),
                })?;

        body.into_page()
    }
}
