//! Search API error types.

/// Errors from the SerpAPI HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum SerpError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The API rejected the query, either with a non-success status or an
    /// `error` field in an otherwise successful response.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Rate limited or out of search credits
    #[error("rate limited by search API")]
    RateLimited,
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl SerpError {
    /// Whether the failure was caused by the query rather than the upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SerpError::Api { status, .. } if (400..500).contains(status))
    }
}
