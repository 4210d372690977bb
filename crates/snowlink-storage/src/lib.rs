//! Mapping store adapters for snowlink.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use snowlink_core::repository::{ReadRepository, Repository, Result};
pub use snowlink_core::StorageError;
