use jiff::Timestamp;
use snowlink_core::{ReadRepository, ShortCode, UrlCache};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The code maps to this original URL.
    Found(String),
    /// The code was never stored.
    NotFound,
    /// The code was stored but its mapping is past `expire_at`.
    Expired,
}

/// The resolution flow.
///
/// Uses a read-only repository as the source of truth and a [`UrlCache`] in
/// front of it. Cache hits are returned as-is; a cache entry never outlives
/// the mapping it was populated from, so hits need no expiry check.
pub struct RedirectorService<R: ?Sized, C: ?Sized> {
    repository: Arc<R>,
    cache: Arc<C>,
}

impl<R, C> RedirectorService<R, C>
where
    R: ReadRepository + ?Sized,
    C: UrlCache + ?Sized,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self { repository, cache }
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution::Found(url))` - Served from the cache, or from a live mapping
    /// * `Ok(Resolution::NotFound)` - If the code doesn't exist
    /// * `Ok(Resolution::Expired)` - If the mapping exists but has expired
    /// * `Err(e)` - If the store could not be read
    pub async fn resolve(&self, code: &ShortCode) -> crate::Result<Resolution> {
        trace!(code = %code, "resolving short code");

        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                debug!(code = %code, "Resolved from cache");
                return Ok(Resolution::Found(url));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(code = %code, error = %e, "Cache read failed, falling back to store");
            }
        }

        let Some(mapping) = self.repository.get(code).await? else {
            trace!(code = %code, "Short code not found");
            return Ok(Resolution::NotFound);
        };

        let now = Timestamp::now();
        if mapping.is_expired_at(now) {
            debug!(code = %code, expire_at = %mapping.expire_at, "Mapping has expired");
            return Ok(Resolution::Expired);
        }

        let Some(ttl) = mapping.remaining_ttl(now) else {
            debug!(code = %code, "Mapping expires now, serving without caching");
            return Ok(Resolution::Found(mapping.original_url));
        };

        if let Err(e) = self.cache.set_url(code, &mapping.original_url, ttl).await {
            warn!(code = %code, error = %e, "Failed to populate cache");
        } else {
            debug!(code = %code, ttl_ms = ttl.as_millis() as u64, "Populated cache from store");
        }

        Ok(Resolution::Found(mapping.original_url))
    }
}
