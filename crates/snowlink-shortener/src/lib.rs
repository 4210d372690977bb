//! Submission flow of the URL shortener.
//!
//! [`ShortenerService`] validates a submitted URL, reuses the code of a live
//! mapping for the same URL, and otherwise mints a new code and persists it.

pub mod error;
pub mod service;

pub use error::ShortenerError;
pub use service::{Shortened, ShortenerService, ShortenerSettings};
