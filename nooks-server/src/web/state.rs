//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedSearchClient;
use crate::llm::LlmClient;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached SerpAPI client
    pub search: Arc<CachedSearchClient>,

    /// Completion client for expense estimates
    pub llm: Arc<LlmClient>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(search: CachedSearchClient, llm: LlmClient) -> Self {
        Self {
            search: Arc::new(search),
            llm: Arc::new(llm),
        }
    }
}
