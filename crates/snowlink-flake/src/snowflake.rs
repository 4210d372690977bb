use crate::{
    clock::{Clock, SystemClock},
    error::Error,
    FlakeId,
};
use jiff::Timestamp;
use std::sync::Mutex;
use typed_builder::TypedBuilder;

const MAX_TIMESTAMP_MS: u64 = (1_u64 << 41) - 1;
const MAX_SEQUENCE: u16 = (1 << 12) - 1;

/// Largest node id that fits the 10-bit node field.
pub const MAX_NODE_ID: u16 = (1 << 10) - 1;

/// Largest backward clock step `next_id` waits out while holding the
/// generator lock. Larger steps fail with [`Error::ClockMovedBackwards`].
pub const MAX_BACKWARD_WAIT_MS: i64 = 10;

/// Default custom epoch, 2010-11-04T01:42:54.657Z, in Unix milliseconds.
pub const DEFAULT_EPOCH_MS: i64 = 1_288_834_974_657;

/// Configures a Snowflake generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct SnowflakeSettings {
    /// A node index in the range `[0, 1023]`, unique per running instance.
    #[builder]
    pub node_id: u16,
    /// Custom epoch used as the zero point for the 41-bit timestamp field.
    #[builder(default = Timestamp::constant(1_288_834_974, 657_000_000))]
    pub start_epoch: Timestamp,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_millisecond: Option<i64>,
    sequence: u16,
}

/// Millisecond snowflake generator that blocks instead of wrapping.
pub struct Snowflake<C: Clock> {
    start_epoch: Timestamp,
    node_id: u16,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Snowflake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: SnowflakeSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Snowflake<C> {
    /// Creates a generator reading time from `clock`.
    pub fn with_clock(settings: SnowflakeSettings, clock: C) -> Result<Self, Error> {
        if settings.node_id > MAX_NODE_ID {
            return Err(Error::InvalidNodeId {
                node_id: settings.node_id,
                max_node_id: MAX_NODE_ID,
            });
        }

        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        Ok(Self {
            start_epoch: settings.start_epoch,
            node_id: settings.node_id,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    /// Node id embedded in every generated id.
    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Generates the next unique id.
    ///
    /// - if the per-millisecond sequence is exhausted, wait for the next millisecond
    /// - if the clock moves backward by at most [`MAX_BACKWARD_WAIT_MS`], wait until it
    ///   catches up with the last issued millisecond; fail on larger steps
    pub fn next_id(&self) -> Result<FlakeId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let mut now = self.clock.now().as_millisecond();
        let mut sequence = 0;

        if let Some(last) = state.last_millisecond {
            if now < last {
                // Reusing an older millisecond could repeat a
                // (timestamp, node_id, sequence) triple.
                let behind_ms = last - now;
                if behind_ms > MAX_BACKWARD_WAIT_MS {
                    return Err(Error::ClockMovedBackwards {
                        behind_ms,
                        max_ms: MAX_BACKWARD_WAIT_MS,
                    });
                }
                self.clock.wait_until(millisecond(last)?);
                now = self.clock.now().as_millisecond();
            }

            if now == last {
                if state.sequence < MAX_SEQUENCE {
                    sequence = state.sequence + 1;
                } else {
                    self.clock.wait_until(millisecond(last + 1)?);
                    now = self.clock.now().as_millisecond();
                }
            }
        }

        let elapsed = now - self.start_epoch.as_millisecond();
        let elapsed = u64::try_from(elapsed).map_err(|_| Error::EpochAhead {
            epoch: self.start_epoch,
            now: self.clock.now(),
        })?;
        if elapsed > MAX_TIMESTAMP_MS {
            return Err(Error::OverTimeLimit);
        }

        let id = FlakeId::new()
            .with_timestamp(elapsed)
            .with_node_id(self.node_id)
            .with_sequence(sequence);

        state.last_millisecond = Some(now);
        state.sequence = sequence;

        Ok(id)
    }
}

fn millisecond(ms: i64) -> Result<Timestamp, Error> {
    Timestamp::from_millisecond(ms).map_err(|_| Error::OverTimeLimit)
}
