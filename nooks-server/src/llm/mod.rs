//! Hosted LLM completion client.
//!
//! Talks to Groq's OpenAI-compatible chat completion endpoint. Callers ask
//! for JSON-object answers and validate the content themselves.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_MODEL, LlmClient, LlmConfig};
pub use error::LlmError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ResponseFormat};
