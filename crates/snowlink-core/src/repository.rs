use crate::error::StorageError;
use crate::mapping::Mapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of the durable mapping store.
///
/// This trait provides only the lookups the redirector needs, so the
/// resolution side can be handed read-only access.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping stored under `code`, expired or not.
    ///
    /// Returns `None` if the code was never stored. Expiry is judged by the
    /// caller so that expired and unknown codes stay distinguishable.
    async fn get(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Releases the connections held by the store. Called once on shutdown.
    async fn close(&self) {}
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Finds the mapping currently holding `original_url`, if any.
    ///
    /// May return an expired mapping; callers decide what to do with it.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<Mapping>>;

    /// Inserts a new mapping.
    ///
    /// Fails with [`StorageError::DuplicateCode`] if the code is taken, and
    /// with [`StorageError::DuplicateUrl`] if a live mapping already holds the
    /// same original URL. The URL check and the write are atomic, so two
    /// concurrent inserts for one URL cannot both succeed. An expired mapping
    /// for the same URL does not block the insert.
    async fn insert(&self, mapping: &Mapping) -> Result<()>;
}
