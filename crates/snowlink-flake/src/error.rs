use jiff::Timestamp;
use thiserror::Error;

/// Errors returned by Snowflake initialization and ID generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid node id {node_id}; expected 0..={max_node_id}")]
    InvalidNodeId { node_id: u16, max_node_id: u16 },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    #[error("clock moved backwards by {behind_ms}ms, more than the {max_ms}ms that is waited out")]
    ClockMovedBackwards { behind_ms: i64, max_ms: i64 },
    #[error("elapsed time since epoch exceeds the 41-bit timestamp field")]
    OverTimeLimit,
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}
