use crate::error::ShortenerError;
use jiff::{SignedDuration, Timestamp};
use snowlink_core::{Mapping, Repository, ShortCode, StorageError};
use snowlink_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};
use typed_builder::TypedBuilder;
use url::Url;

/// Seven days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Public origin the short URLs are built from, e.g. `https://sl.example`.
    #[builder(setter(into))]
    base_url: String,
    /// Lifetime of newly created mappings.
    #[builder(default = DEFAULT_TTL)]
    ttl: Duration,
}

impl ShortenerSettings {
    /// Expiry of a mapping created at `now`.
    pub fn expire_at(&self, now: Timestamp) -> Result<Timestamp, ShortenerError> {
        let ttl = SignedDuration::try_from(self.ttl)
            .map_err(|e| ShortenerError::InvalidExpiration(e.to_string()))?;
        now.checked_add(ttl)
            .map_err(|e| ShortenerError::InvalidExpiration(e.to_string()))
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub code: ShortCode,
    pub short_url: String,
    pub expire_at: Timestamp,
}

/// The submission flow.
///
/// Wraps a [`Repository`] and a [`Generator`]. The generator is responsible
/// for code uniqueness, so no collision retry is performed on the code; the
/// repository is responsible for keeping live original URLs unique.
///
/// Both collaborators may be trait objects, which lets the binary pick its
/// backends at start-up.
pub struct ShortenerService<R: ?Sized, G: ?Sized> {
    repository: Arc<R>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, G> ShortenerService<R, G>
where
    R: Repository + ?Sized,
    G: Generator + ?Sized,
{
    pub fn new(repository: Arc<R>, generator: Arc<G>, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            generator,
            settings,
        }
    }

    /// Shortens `url`, reusing the code of a live mapping for the same URL.
    ///
    /// The URL is stored in its parsed, serialized form, so inputs that parse
    /// to the same URL share a mapping.
    pub async fn shorten(&self, url: &str) -> Result<Shortened, ShortenerError> {
        let parsed = validate_url(url)?;
        let url = parsed.as_str();

        let now = Timestamp::now();
        if let Some(existing) = self.live_mapping_for(url, now).await? {
            debug!(code = %existing.code, "Reusing live mapping for url");
            return Ok(self.shortened(existing));
        }

        let code = self.generator.generate()?;
        let expire_at = self.settings.expire_at(now)?;
        let mapping = Mapping::new(code, url, expire_at);

        match self.repository.insert(&mapping).await {
            Ok(()) => {
                info!(code = %mapping.code, expire_at = %mapping.expire_at, "Created mapping");
                Ok(self.shortened(mapping))
            }
            Err(StorageError::DuplicateUrl(_)) => {
                debug!(code = %mapping.code, "Concurrent submission won, re-reading by url");
                match self.live_mapping_for(url, Timestamp::now()).await? {
                    Some(winner) => Ok(self.shortened(winner)),
                    None => Err(ShortenerError::Storage(format!(
                        "insert conflicted on url but no live mapping holds it: {url}"
                    ))),
                }
            }
            Err(e) => Err(storage_error("failed to insert mapping", e)),
        }
    }

    async fn live_mapping_for(
        &self,
        url: &str,
        now: Timestamp,
    ) -> Result<Option<Mapping>, ShortenerError> {
        trace!("Looking up existing mapping by url");
        let found = self
            .repository
            .find_by_url(url)
            .await
            .map_err(|e| storage_error("failed to look up mapping by url", e))?;
        Ok(found.filter(|mapping| !mapping.is_expired_at(now)))
    }

    fn shortened(&self, mapping: Mapping) -> Shortened {
        Shortened {
            short_url: mapping.code.to_url(&self.settings.base_url),
            code: mapping.code,
            expire_at: mapping.expire_at,
        }
    }
}

/// Accepts absolute http(s) URLs that name a host.
fn validate_url(url: &str) -> Result<Url, ShortenerError> {
    if url.trim().is_empty() {
        return Err(ShortenerError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| ShortenerError::InvalidUrl(format!("{url}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must have a host: {url}"
        )));
    }

    Ok(parsed)
}

fn storage_error(operation: &str, err: StorageError) -> ShortenerError {
    ShortenerError::Storage(format!("{operation}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use snowlink_core::base62::EncodeError;
    use snowlink_core::repository::Result as StorageResult;
    use snowlink_core::ReadRepository;
    use snowlink_generator::seq::SeqGenerator;
    use snowlink_generator::GeneratorError;
    use snowlink_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE_URL: &str = "https://sl.test";

    fn settings() -> ShortenerSettings {
        ShortenerSettings::builder().base_url(BASE_URL).build()
    }

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(SeqGenerator::with_offset(12345)),
            settings(),
        )
    }

    /// Counts calls and delegates to an in-memory store.
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        finds: AtomicUsize,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl ReadRepository for CountingRepository {
        async fn get(&self, code: &ShortCode) -> StorageResult<Option<Mapping>> {
            self.inner.get(code).await
        }
    }

    #[async_trait]
    impl Repository for CountingRepository {
        async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<Mapping>> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_url(original_url).await
        }

        async fn insert(&self, mapping: &Mapping) -> StorageResult<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(mapping).await
        }
    }

    /// Lets a competing submission land between the dedup lookup and the insert.
    struct RacingRepository {
        inner: InMemoryRepository,
        winner: Mapping,
    }

    #[async_trait]
    impl ReadRepository for RacingRepository {
        async fn get(&self, code: &ShortCode) -> StorageResult<Option<Mapping>> {
            self.inner.get(code).await
        }
    }

    #[async_trait]
    impl Repository for RacingRepository {
        async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<Mapping>> {
            self.inner.find_by_url(original_url).await
        }

        async fn insert(&self, mapping: &Mapping) -> StorageResult<()> {
            // First call: the competitor commits, then ours is checked.
            if self.inner.is_empty() {
                self.inner.insert(&self.winner).await?;
            }
            self.inner.insert(mapping).await
        }
    }

    struct UnavailableRepository;

    #[async_trait]
    impl ReadRepository for UnavailableRepository {
        async fn get(&self, _code: &ShortCode) -> StorageResult<Option<Mapping>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl Repository for UnavailableRepository {
        async fn find_by_url(&self, _original_url: &str) -> StorageResult<Option<Mapping>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn insert(&self, _mapping: &Mapping) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    struct BrokenGenerator;

    impl Generator for BrokenGenerator {
        fn generate(&self) -> Result<ShortCode, GeneratorError> {
            Err(GeneratorError::Encode(EncodeError::Negative(-1)))
        }
    }

    #[tokio::test]
    async fn shorten_returns_code_and_short_url() {
        let service = test_service();
        let before = Timestamp::now();

        let shortened = service.shorten("https://example.com/a").await.unwrap();

        assert_eq!(shortened.code.as_str(), "3d7");
        assert_eq!(shortened.short_url, "https://sl.test/3d7");
        let ttl = SignedDuration::try_from(DEFAULT_TTL).unwrap();
        assert!(shortened.expire_at >= before + ttl);
        assert!(shortened.expire_at <= Timestamp::now() + ttl);
    }

    #[tokio::test]
    async fn shortened_code_is_persisted() {
        let repository = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::new(
            repository.clone(),
            Arc::new(SeqGenerator::new()),
            settings(),
        );

        let shortened = service.shorten("https://example.com/a").await.unwrap();

        let stored = repository.get(&shortened.code).await.unwrap().unwrap();
        assert_eq!(stored.original_url, "https://example.com/a");
        assert_eq!(stored.expire_at, shortened.expire_at);
    }

    #[tokio::test]
    async fn same_url_twice_returns_same_code() {
        let repository = Arc::new(CountingRepository::default());
        let service = ShortenerService::new(
            repository.clone(),
            Arc::new(SeqGenerator::new()),
            settings(),
        );

        let first = service.shorten("https://example.com/a").await.unwrap();
        let second = service.shorten("https://example.com/a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repository.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(repository.finds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn different_urls_get_different_codes() {
        let service = test_service();

        let a = service.shorten("https://example.com/a").await.unwrap();
        let b = service.shorten("https://example.com/b").await.unwrap();

        assert_ne!(a.code, b.code);
    }

    #[tokio::test]
    async fn expired_mapping_is_not_reused() {
        let repository = Arc::new(InMemoryRepository::new());
        let stale = Mapping::new(
            ShortCode::new_unchecked("old"),
            "https://example.com/a",
            Timestamp::now() - SignedDuration::from_secs(1),
        );
        repository.insert(&stale).await.unwrap();

        let service = ShortenerService::new(
            repository.clone(),
            Arc::new(SeqGenerator::new()),
            settings(),
        );
        let fresh = service.shorten("https://example.com/a").await.unwrap();

        assert_ne!(fresh.code.as_str(), "old");
        let holder = repository
            .find_by_url("https://example.com/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holder.code, fresh.code);
    }

    #[tokio::test]
    async fn lost_race_returns_winning_code() {
        let winner = Mapping::new(
            ShortCode::new_unchecked("winner"),
            "https://example.com/a",
            Timestamp::now() + SignedDuration::from_hours(1),
        );
        let repository = Arc::new(RacingRepository {
            inner: InMemoryRepository::new(),
            winner,
        });
        let service = ShortenerService::new(repository, Arc::new(SeqGenerator::new()), settings());

        let shortened = service.shorten("https://example.com/a").await.unwrap();

        assert_eq!(shortened.code.as_str(), "winner");
        assert_eq!(shortened.short_url, "https://sl.test/winner");
    }

    #[tokio::test]
    async fn concurrent_submissions_agree_on_one_code() {
        let service = Arc::new(test_service());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.shorten("https://example.com/hot").await
            }));
        }

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap().code);
        }
        codes.dedup();
        assert_eq!(codes.len(), 1);
    }

    #[tokio::test]
    async fn invalid_urls_are_rejected() {
        let service = test_service();

        for url in [
            "",
            "   ",
            "not-a-valid-url",
            "ftp://example.com/file",
            "mailto:someone@example.com",
            "https://",
        ] {
            let err = service.shorten(url).await.unwrap_err();
            assert!(
                matches!(err, ShortenerError::InvalidUrl(_)),
                "{url:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn url_is_stored_in_parsed_form() {
        let repository = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::new(
            repository.clone(),
            Arc::new(SeqGenerator::new()),
            settings(),
        );

        let shortened = service.shorten("https://example.com/a\nb\t").await.unwrap();

        let stored = repository.get(&shortened.code).await.unwrap().unwrap();
        assert_eq!(stored.original_url, "https://example.com/ab");
    }

    #[tokio::test]
    async fn whitespace_variants_share_one_mapping() {
        let repository = Arc::new(CountingRepository::default());
        let service = ShortenerService::new(
            repository.clone(),
            Arc::new(SeqGenerator::new()),
            settings(),
        );

        let plain = service.shorten("https://example.com/a").await.unwrap();
        let padded = service.shorten("  https://example.com/a ").await.unwrap();

        assert_eq!(plain, padded);
        assert_eq!(repository.inserts.load(Ordering::SeqCst), 1);
        let stored = repository.get(&plain.code).await.unwrap().unwrap();
        assert_eq!(stored.original_url, "https://example.com/a");
    }

    #[tokio::test]
    async fn storage_failure_is_retryable() {
        let service = ShortenerService::new(
            Arc::new(UnavailableRepository),
            Arc::new(SeqGenerator::new()),
            settings(),
        );

        let err = service.shorten("https://example.com/a").await.unwrap_err();

        assert!(matches!(err, ShortenerError::Storage(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn generator_failure_surfaces() {
        let service = ShortenerService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(BrokenGenerator),
            settings(),
        );

        let err = service.shorten("https://example.com/a").await.unwrap_err();

        assert!(matches!(err, ShortenerError::Generator(_)));
        assert!(!err.is_retryable());
    }

    struct SkewedClockGenerator;

    impl Generator for SkewedClockGenerator {
        fn generate(&self) -> Result<ShortCode, GeneratorError> {
            Err(GeneratorError::Flake(
                snowlink_flake::Error::ClockMovedBackwards {
                    behind_ms: 500,
                    max_ms: 10,
                },
            ))
        }
    }

    #[tokio::test]
    async fn clock_skew_is_retryable() {
        let service = ShortenerService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(SkewedClockGenerator),
            settings(),
        );

        let err = service.shorten("https://example.com/a").await.unwrap_err();

        assert!(matches!(err, ShortenerError::Generator(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn works_behind_trait_objects() {
        let repository: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        let generator: Arc<dyn Generator> = Arc::new(SeqGenerator::new());
        let service = ShortenerService::new(repository, generator, settings());

        let shortened = service.shorten("http://example.com").await.unwrap();
        assert_eq!(shortened.code.as_str(), "0");
    }

    #[test]
    fn custom_ttl_sets_expiry() {
        let settings = ShortenerSettings::builder()
            .base_url(BASE_URL)
            .ttl(Duration::from_secs(60))
            .build();
        let now = Timestamp::from_second(1_000).unwrap();

        let expire_at = settings.expire_at(now).unwrap();

        assert_eq!(expire_at, Timestamp::from_second(1_060).unwrap());
    }

    #[test]
    fn unrepresentable_ttl_is_rejected() {
        let settings = ShortenerSettings::builder()
            .base_url(BASE_URL)
            .ttl(Duration::from_secs(u64::MAX))
            .build();

        let err = settings.expire_at(Timestamp::now()).unwrap_err();

        assert!(matches!(err, ShortenerError::InvalidExpiration(_)));
    }
}
