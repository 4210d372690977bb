//! Core types and traits for the snowlink URL shortener.
//!
//! This crate provides the shared vocabulary used by the shortener
//! (submission) and redirector (resolution) services: the base62 codec,
//! short codes, the persisted [`Mapping`], and the storage and cache
//! adapter traits.

pub mod base62;
pub mod cache;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod shortcode;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, StorageError};
pub use mapping::Mapping;
pub use repository::{ReadRepository, Repository};
pub use shortcode::ShortCode;
