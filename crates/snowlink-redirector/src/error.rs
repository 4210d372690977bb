use snowlink_core::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    /// The durable store could not be read. Transient, and distinct from a
    /// code that is unknown or expired.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
