//! Resolution flow of the URL shortener.
//!
//! [`RedirectorService`] resolves short codes cache-aside: the [`UrlCache`]
//! is consulted first, the durable store on a miss, and live mappings read
//! from the store are written back to the cache for exactly their remaining
//! lifetime.
//!
//! # Example
//!
//! ```rust,no_run
//! use snowlink_cache::MokaUrlCache;
//! use snowlink_core::ShortCode;
//! use snowlink_redirector::{RedirectorService, Resolution};
//! use snowlink_storage::InMemoryRepository;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedirectorService::new(
//!     Arc::new(InMemoryRepository::new()),
//!     Arc::new(MokaUrlCache::new()),
//! );
//!
//! let code = ShortCode::new("3d7")?;
//! if let Resolution::Found(url) = service.resolve(&code).await? {
//!     println!("Redirect to: {}", url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`UrlCache`]: snowlink_core::UrlCache

pub mod error;
pub mod service;

pub use error::RedirectorError;
pub use service::{RedirectorService, Resolution};

/// Result type for redirector operations.
pub type Result<T> = std::result::Result<T, RedirectorError>;
