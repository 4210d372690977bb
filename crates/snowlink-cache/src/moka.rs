use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use snowlink_core::{ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::Result;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-process cache implementation using Moka.
///
/// Every entry carries its own TTL, so an entry never outlives the mapping it
/// was populated from. Suitable for single-node deployments.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.original_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, ttl_ms = ttl.as_millis() as u64, "Storing URL in Moka cache");

        let entry = CachedUrl {
            original_url: original_url.to_string(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), entry).await;
        debug!(code = %code, "Cached URL in Moka");
        Ok(())
    }

    async fn close(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("Moka cache cleared");
    }
}

/// Configuration for creating a [`MokaUrlCache`] with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_MAX_CAPACITY)]
    max_capacity: u64,
}

impl From<CacheConfig> for MokaUrlCache {
    fn from(config: CacheConfig) -> Self {
        MokaUrlCache::with_capacity(config.max_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache
            .set_url(&c, "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        let result = cache.get_url(&c).await.unwrap();
        assert_eq!(result.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn entry_expires_after_its_own_ttl() {
        let cache = MokaUrlCache::new();
        let short = code("short");
        let long = code("long");

        cache
            .set_url(&short, "https://example.com/short", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&long, "https://example.com/long", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get_url(&short).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&short).await.unwrap().is_none());
        assert_eq!(
            cache.get_url(&long).await.unwrap().as_deref(),
            Some("https://example.com/long")
        );
    }

    #[tokio::test]
    async fn overwrite_replaces_url_and_ttl() {
        let cache = MokaUrlCache::new();
        let c = code("overwrite");

        cache
            .set_url(&c, "https://example.com/old", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&c, "https://example.com/new", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(
            cache.get_url(&c).await.unwrap().as_deref(),
            Some("https://example.com/new")
        );
    }

    #[tokio::test]
    async fn cache_builder_pattern() {
        let cache: MokaUrlCache = MokaUrlCache::builder().max_capacity(1000).build().into();
        let c = code("abc123");

        cache
            .set_url(&c, "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cache_handles_many_entries() {
        let cache = MokaUrlCache::with_capacity(100);

        for i in 0..50 {
            let c = code(&format!("code{i}"));
            cache
                .set_url(&c, &format!("https://example{i}"), Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert_eq!(
            cache.get_url(&code("code0")).await.unwrap().as_deref(),
            Some("https://example0")
        );
        assert_eq!(
            cache.get_url(&code("code49")).await.unwrap().as_deref(),
            Some("https://example49")
        );
    }

    #[tokio::test]
    async fn close_drops_entries() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache
            .set_url(&c, "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();
        cache.close().await;

        assert!(cache.get_url(&c).await.unwrap().is_none());
    }
}
