//! Caching layer for search API responses.
//!
//! Every SerpAPI search costs a credit, and the client re-issues identical
//! searches as users page back and forth between results. Responses are
//! cached by their exact query parameters (the API key is never part of the
//! key) for a short TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::serp::{
    FlightQuery, FlightsResponse, HotelDetailsQuery, HotelDetailsResponse, HotelQuery,
    HotelsResponse, QueryParams, SerpClient, SerpError,
};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per response kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 500,
        }
    }
}

/// Cache for search API responses, one map per response kind.
pub struct SearchCache {
    flights: MokaCache<QueryParams, Arc<FlightsResponse>>,
    hotels: MokaCache<QueryParams, Arc<HotelsResponse>>,
    hotel_details: MokaCache<QueryParams, Arc<HotelDetailsResponse>>,
}

impl SearchCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            flights: build(config),
            hotels: build(config),
            hotel_details: build(config),
        }
    }
}

fn build<V>(config: &CacheConfig) -> MokaCache<QueryParams, V>
where
    V: Clone + Send + Sync + 'static,
{
    MokaCache::builder()
        .time_to_live(config.ttl)
        .max_capacity(config.max_capacity)
        .build()
}

/// Search client with caching.
///
/// Wraps a `SerpClient`; only successful responses are cached.
pub struct CachedSearchClient {
    client: SerpClient,
    cache: SearchCache,
}

impl CachedSearchClient {
    /// Create a new cached client.
    pub fn new(client: SerpClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: SearchCache::new(cache_config),
        }
    }

    pub async fn search_flights(
        &self,
        query: &FlightQuery,
    ) -> Result<Arc<FlightsResponse>, SerpError> {
        let key = query.params();

        if let Some(cached) = self.cache.flights.get(&key).await {
            debug!(route = %query.route, "flight search cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(self.client.search_flights(query).await?);
        self.cache.flights.insert(key, entry.clone()).await;

        Ok(entry)
    }

    pub async fn search_hotels(
        &self,
        query: &HotelQuery,
    ) -> Result<Arc<HotelsResponse>, SerpError> {
        let key = query.params();

        if let Some(cached) = self.cache.hotels.get(&key).await {
            debug!(q = %query.stay.q, "hotel search cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(self.client.search_hotels(query).await?);
        self.cache.hotels.insert(key, entry.clone()).await;

        Ok(entry)
    }

    pub async fn hotel_details(
        &self,
        query: &HotelDetailsQuery,
    ) -> Result<Arc<HotelDetailsResponse>, SerpError> {
        let key = query.params();

        if let Some(cached) = self.cache.hotel_details.get(&key).await {
            debug!(token = %query.property_token, "hotel details cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(self.client.hotel_details(query).await?);
        self.cache.hotel_details.insert(key, entry.clone()).await;

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_capacity, 500);
    }

    #[tokio::test]
    async fn keys_are_exact_params() {
        let cache = SearchCache::new(&CacheConfig::default());
        let key: QueryParams = vec![
            ("engine", "google_hotels".to_string()),
            ("q", "Paris".to_string()),
        ];
        cache
            .hotels
            .insert(key.clone(), Arc::new(HotelsResponse::default()))
            .await;

        assert!(cache.hotels.get(&key).await.is_some());

        let other: QueryParams = vec![
            ("engine", "google_hotels".to_string()),
            ("q", "Lyon".to_string()),
        ];
        assert!(cache.hotels.get(&other).await.is_none());
        assert!(cache.flights.get(&key).await.is_none());
    }
}
