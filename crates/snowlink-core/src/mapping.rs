use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A persisted association between a short code and its original URL.
///
/// Mappings are written once and never updated. A mapping whose `expire_at`
/// has passed is logically gone even if the store still holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Primary key in the durable store.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// The last instant at which the mapping still resolves.
    pub expire_at: Timestamp,
}

impl Mapping {
    pub fn new(code: ShortCode, original_url: impl Into<String>, expire_at: Timestamp) -> Self {
        Self {
            code,
            original_url: original_url.into(),
            expire_at,
        }
    }

    /// Whether the mapping is expired as of `now`, i.e. `now` is past `expire_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expire_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Time left until `expire_at`, or `None` when nothing is left.
    ///
    /// `None` at exactly `expire_at`, where the mapping is still live but must
    /// not be cached. A cache entry populated from this mapping must not live
    /// longer than this.
    pub fn remaining_ttl(&self, now: Timestamp) -> Option<Duration> {
        let remaining = self.expire_at.duration_since(now);
        if remaining.is_zero() || remaining.is_negative() {
            return None;
        }
        Duration::try_from(remaining).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn mapping(expire_at: Timestamp) -> Mapping {
        Mapping::new(ShortCode::new_unchecked("abc"), "https://example.com", expire_at)
    }

    #[test]
    fn live_before_expire_at() {
        let now = Timestamp::now();
        let m = mapping(now + SignedDuration::from_secs(10));
        assert!(!m.is_expired_at(now));
        assert!(!m.is_expired());
    }

    #[test]
    fn live_at_boundary_expired_after() {
        let now = Timestamp::now();
        let m = mapping(now);
        assert!(!m.is_expired_at(now));
        assert!(m.is_expired_at(now + SignedDuration::from_nanos(1)));
        assert!(m.is_expired_at(now + SignedDuration::from_millis(1)));
    }

    #[test]
    fn nothing_left_to_cache_at_boundary() {
        let now = Timestamp::from_second(1_000).unwrap();
        let m = mapping(now);
        assert!(!m.is_expired_at(now));
        assert_eq!(m.remaining_ttl(now), None);
    }

    #[test]
    fn remaining_ttl_is_exact_gap() {
        let now = Timestamp::from_second(1_000).unwrap();
        let m = mapping(now + SignedDuration::from_millis(2_500));
        assert_eq!(m.remaining_ttl(now), Some(Duration::from_millis(2_500)));
    }

    #[test]
    fn remaining_ttl_is_none_once_expired() {
        let now = Timestamp::from_second(1_000).unwrap();
        assert_eq!(mapping(now).remaining_ttl(now), None);
        assert_eq!(
            mapping(now - SignedDuration::from_secs(1)).remaining_ttl(now),
            None
        );
    }
}
