use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use snowlink_core::repository::{ReadRepository, Repository, Result};
use snowlink_core::{Mapping, ShortCode, StorageError};

/// In-memory implementation of the repository traits using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
///
/// Two indexes are kept: mappings by code, and the mapping currently
/// holding each original URL. Inserts lock the URL slot before the code
/// slot, which makes the URL uniqueness check atomic with the write.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    by_code: DashMap<String, Mapping>,
    by_url: DashMap<String, Mapping>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mappings stored, expired ones included.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    fn insert_code(&self, mapping: &Mapping) -> Result<()> {
        match self.by_code.entry(mapping.code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateCode(mapping.code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(mapping.clone());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        Ok(self.by_code.get(code.as_str()).map(|entry| entry.clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<Mapping>> {
        Ok(self.by_url.get(original_url).map(|entry| entry.clone()))
    }

    async fn insert(&self, mapping: &Mapping) -> Result<()> {
        match self.by_url.entry(mapping.original_url.clone()) {
            Entry::Occupied(mut slot) => {
                if !slot.get().is_expired_at(Timestamp::now()) {
                    return Err(StorageError::DuplicateUrl(mapping.original_url.clone()));
                }
                // The expired holder keeps its code entry and still resolves as expired.
                self.insert_code(mapping)?;
                slot.insert(mapping.clone());
            }
            Entry::Vacant(slot) => {
                self.insert_code(mapping)?;
                slot.insert(mapping.clone());
            }
        }
        Ok(())
    }
}
