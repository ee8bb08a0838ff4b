//! SerpAPI HTTP client.
//!
//! Issues Google Flights and Google Hotels searches and decodes the JSON into
//! the DTOs in `types`. The API key travels as a query parameter.

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::SerpError;
use super::query::{FlightQuery, HotelDetailsQuery, HotelQuery, QueryParams};
use super::types::{FlightsResponse, HotelDetailsResponse, HotelsResponse};

/// Default base URL for SerpAPI.
const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How much of an unparseable body to keep in errors.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the SerpAPI client.
#[derive(Debug, Clone)]
pub struct SerpConfig {
    pub api_key: String,
    /// Base URL for the API (defaults to production SerpAPI)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SerpConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// SerpAPI client.
#[derive(Debug, Clone)]
pub struct SerpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SerpConfig) -> Result<Self, SerpError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Search flights. Covers one-way, round-trip, multi-city and
    /// `departure_token` continuations.
    pub async fn search_flights(&self, query: &FlightQuery) -> Result<FlightsResponse, SerpError> {
        self.fetch(&query.params()).await
    }

    /// Search hotels for a stay.
    pub async fn search_hotels(&self, query: &HotelQuery) -> Result<HotelsResponse, SerpError> {
        self.fetch(&query.params()).await
    }

    /// Look up a single property by token.
    pub async fn hotel_details(
        &self,
        query: &HotelDetailsQuery,
    ) -> Result<HotelDetailsResponse, SerpError> {
        self.fetch(&query.params()).await
    }

    /// Run a search and decode the response.
    ///
    /// SerpAPI reports some failures as a 200 with an `error` field; those
    /// are surfaced as `SerpError::Api` like any other rejection.
    async fn fetch<T: DeserializeOwned>(&self, params: &QueryParams) -> Result<T, SerpError> {
        let url = format!("{}/search.json", self.base_url);
        let engine = params
            .iter()
            .find(|(k, _)| *k == "engine")
            .map(|(_, v)| v.as_str())
            .unwrap_or("unknown");
        debug!(engine, params = params.len(), "search api request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SerpError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SerpError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SerpError::Api {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or(body),
            });
        }

        let body = response.text().await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SerpError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
            })?;

        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Err(SerpError::Api {
                status: reqwest::StatusCode::BAD_REQUEST.as_u16(),
                message: message.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| SerpError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
        })
    }
}

/// Extract SerpAPI's `{"error": "..."}` message from a failure body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SerpConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = SerpConfig::new("test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn client_creation_trims_base_url() {
        let client = SerpClient::new(SerpConfig::new("k").with_base_url("http://x/")).unwrap();
        assert_eq!(client.base_url, "http://x");
    }

    #[test]
    fn extracts_error_message() {
        assert_eq!(
            error_message(r#"{"error": "Invalid API key."}"#).as_deref(),
            Some("Invalid API key.")
        );
        assert_eq!(error_message("<html>"), None);
        assert_eq!(error_message(r#"{"status": "bad"}"#), None);
    }
}
