pub mod seq;

use snowlink_core::base62::EncodeError;
use snowlink_core::ShortCode;
use snowlink_flake::{Clock, Snowflake};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("id generation failed: {0}")]
    Flake(#[from] snowlink_flake::Error),
    #[error("id could not be encoded: {0}")]
    Encode(#[from] EncodeError),
}

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage, and
/// are responsible for never handing out the same code twice.
pub trait Generator: Send + Sync + 'static {
    /// Generates a globally unique short code.
    fn generate(&self) -> Result<ShortCode, GeneratorError>;
}

impl<C: Clock + 'static> Generator for Snowflake<C> {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let id = self.next_id()?;
        Ok(ShortCode::from_id(id.as_i64())?)
    }
}
