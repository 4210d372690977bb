//! Cache adapters for resolved short codes.

pub mod moka;
pub mod redis;

pub use self::moka::{CacheConfig, MokaUrlCache};
pub use self::redis::RedisUrlCache;
pub use snowlink_core::cache::{Result, UrlCache};
pub use snowlink_core::CacheError;
