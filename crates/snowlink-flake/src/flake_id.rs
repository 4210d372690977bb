use modular_bitfield::prelude::*;
use std::fmt;

/// A 64-bit snowflake id.
///
/// Fields are packed least significant first, so the integer value reads
/// `timestamp << 22 | node_id << 12 | sequence` and the sign bit stays clear.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlakeId {
    /// 12 bits for the sequence number (resets every millisecond).
    pub sequence: B12,
    /// 10 bits for the node id (allows up to 1024 nodes).
    pub node_id: B10,
    /// 41 bits for milliseconds since a custom epoch.
    pub timestamp: B41,
    #[skip]
    __: B1,
}

impl FlakeId {
    /// Returns the id as an unsigned integer.
    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.into_bytes())
    }

    /// Returns the id as a signed integer. Always non-negative.
    pub fn as_i64(&self) -> i64 {
        // the top bit is never set, so this cannot wrap
        self.as_u64() as i64
    }
}

impl From<FlakeId> for u64 {
    fn from(id: FlakeId) -> Self {
        id.as_u64()
    }
}

impl PartialOrd for FlakeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlakeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_u64().cmp(&other.as_u64())
    }
}

impl fmt::Debug for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlakeId")
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}
