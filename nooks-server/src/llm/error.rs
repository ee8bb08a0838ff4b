//! LLM client error types.

/// Errors from the chat completion client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion envelope could not be decoded
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    #[error("rate limited by completion API")]
    RateLimited,

    /// The model answered with no content
    #[error("completion had no content")]
    EmptyCompletion,

    /// The model's answer is not the JSON object we asked for
    #[error("model answer is not a JSON object: {0}")]
    InvalidAnswer(String),

    /// The model's answer lacks a required numeric field
    #[error("model answer is missing numeric field `{0}`")]
    MissingField(&'static str),
}
