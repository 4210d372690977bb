use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A volatile cache of `code -> original URL` entries.
///
/// Entries are disposable projections of a [`Mapping`](crate::Mapping); the
/// durable store stays authoritative. Implementations can use Redis,
/// in-memory caches, or other backends, and must evict entries on their own
/// once the TTL given to [`set_url`](UrlCache::set_url) runs out.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the original URL cached for `code`.
    ///
    /// Returns `Ok(None)` if the key is not in the cache or has expired.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Cache `original_url` under `code` for exactly `ttl`.
    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()>;

    /// Releases the connections held by the cache. Called once on shutdown.
    async fn close(&self) {}
}
