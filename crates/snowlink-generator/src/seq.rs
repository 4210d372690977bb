use crate::{Generator, GeneratorError};
use snowlink_core::base62;
use snowlink_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A sequential short code generator backed by an atomic counter.
///
/// Produces `"0"`, `"1"`, ... `"a"`, ... in base62. Unique only within a
/// single instance, so it suits tests and single-process development setups.
#[derive(Debug, Default)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator starting from a specific counter value.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(ShortCode::new_unchecked(base62::encode_u64(count)))
    }
}
