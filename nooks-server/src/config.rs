//! Server configuration from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::CacheConfig;
use crate::llm::{DEFAULT_MODEL, LlmConfig};
use crate::serp::SerpConfig;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Error returned when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub serp: SerpConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let serp_key = secret(&lookup, "SERPAPI_API_KEY");
        let groq_key = secret(&lookup, "GROQ_API_KEY");

        let mut serp = SerpConfig::new(serp_key);
        if let Some(url) = lookup("SERPAPI_BASE_URL") {
            serp = serp.with_base_url(url);
        }

        let mut llm =
            LlmConfig::new(groq_key).with_model(lookup("GROQ_MODEL").unwrap_or_else(|| {
                info!("GROQ_MODEL not set, using default: {DEFAULT_MODEL}");
                DEFAULT_MODEL.to_string()
            }));
        if let Some(url) = lookup("GROQ_BASE_URL") {
            llm = llm.with_base_url(url);
        }

        let ttl_secs: u64 = parse_or(&lookup, "SEARCH_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let cache = CacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            ..CacheConfig::default()
        };

        let bind_default: SocketAddr = DEFAULT_BIND.parse().map_err(|_| ConfigError {
            key: "NOOKS_BIND",
            message: "bad built-in default".to_string(),
        })?;
        let bind = parse_or(&lookup, "NOOKS_BIND", bind_default)?;

        Ok(Self {
            bind,
            serp,
            llm,
            cache,
        })
    }
}

/// Read an API key. A missing key is allowed so the server can start, but
/// every call to that upstream will fail.
fn secret(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> String {
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value.trim().to_string(),
        None => {
            warn!("{key} not set. API calls will fail.");
            String::new()
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            message: format!("{raw:?}: {e}"),
        }),
    }
}
