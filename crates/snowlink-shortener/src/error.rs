use snowlink_generator::GeneratorError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("code generation failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ShortenerError {
    /// Whether the failure came from the infrastructure rather than the input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShortenerError::Storage(_)
                | ShortenerError::Generator(GeneratorError::Flake(
                    snowlink_flake::Error::ClockMovedBackwards { .. }
                ))
        )
    }
}
