//! Snowflake-style unique ID generation for snowlink short codes.
//!
//! Each [`FlakeId`] packs milliseconds since a custom epoch, the node id of the
//! generating instance and a per-millisecond sequence into 63 bits, so ids are
//! strictly increasing on one node and never collide across nodes with
//! distinct node ids.

mod clock;
pub mod error;
mod flake_id;
mod snowflake;

pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use flake_id::FlakeId;
pub use snowflake::{
    Snowflake, SnowflakeSettings, DEFAULT_EPOCH_MS, MAX_BACKWARD_WAIT_MS, MAX_NODE_ID,
};
