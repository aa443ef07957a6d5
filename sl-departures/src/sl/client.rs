//! SL realtime departures HTTP client.

use std::time::Duration;

use tracing::debug;

use super::error::SlError;
use super::source::{DepartureSource, SiteQuery};
use super::types::RealtimeResponse;

/// Host serving the realtime departures API.
const API_HOST: &str = "api.sl.se";

/// Path of the JSON realtime departures endpoint.
const DEPARTURES_PATH: &str = "/api2/realtimedeparturesV4.json";

/// Configuration for the SL client.
#[derive(Debug, Clone)]
pub struct SlConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Scheme and host, e.g. `https://api.sl.se`
    pub base_url: String,
    /// Route every request through this proxy
    pub proxy: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SlConfig {
    /// Create a new config; `ssl` selects https over http.
    pub fn new(api_key: impl Into<String>, ssl: bool) -> Self {
        let scheme = if ssl { "https" } else { "http" };
        Self {
            api_key: api_key.into(),
            base_url: format!("{scheme}://{API_HOST}"),
            proxy: None,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Route requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full URL of the departures endpoint.
    pub fn departures_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), DEPARTURES_PATH)
    }
}

/// SL realtime departures API client.
#[derive(Debug, Clone)]
pub struct SlClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl SlClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SlConfig) -> Result<Self, SlError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = &config.proxy {
            debug!(proxy = %proxy, "Using proxy");
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            http: builder.build()?,
            url: config.departures_url(),
            api_key: config.api_key,
        })
    }

    /// Fetch the raw realtime departures for one site.
    ///
    /// Only transport and decoding problems are errors here; the response's
    /// own `StatusCode` is left for the caller to inspect.
    pub async fn get_realtime_departures(
        &self,
        query: &SiteQuery,
    ) -> Result<RealtimeResponse, SlError> {
        let mut params = vec![("key".to_string(), self.api_key.clone())];
        params.extend(query.query_params());

        debug!(site_id = %query.site_id, url = %self.url, "Calling SL");

        let response = self.http.get(&self.url).query(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| SlError::Json {
            message: e.to_string(),
        })
    }
}

impl DepartureSource for SlClient {
    async fn realtime_departures(&self, query: &SiteQuery) -> Result<RealtimeResponse, SlError> {
        self.get_realtime_departures(query).await
    }
}
