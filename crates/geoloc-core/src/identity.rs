//! Identity assignment for newly persisted records.
//!
//! Identifiers are UUIDv7: a 48-bit Unix millisecond timestamp followed by
//! random bits. Generation needs no shared counter and no coordination, so an
//! assigner can be called from any number of request tasks at once.
//!
//! Because the timestamp sits in the high bits, ids sort roughly by creation
//! time, which keeps store indexes append-friendly.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier stamped on a record at its first persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Milliseconds since the Unix epoch encoded in the id, if any.
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.0.get_timestamp().map(|ts| {
            let (secs, nanos) = ts.to_unix();
            secs * 1_000 + u64::from(nanos) / 1_000_000
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A source of fresh record identifiers.
///
/// Implementations must be callable concurrently through a shared reference.
pub trait IdAssigner: Send + Sync {
    fn new_id(&self) -> RecordId;
}

/// The default assigner, backed by UUIDv7.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeRandomIds;

impl IdAssigner for TimeRandomIds {
    fn new_id(&self) -> RecordId {
        new_id()
    }
}

/// Generates a fresh UUIDv7 record id.
pub fn new_id() -> RecordId {
    RecordId(Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ids_are_version_7() {
        let id = new_id();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn id_embeds_current_time() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let id = new_id();
        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let ts = id.timestamp_millis().unwrap();
        assert!(ts >= before && ts <= after, "{before} <= {ts} <= {after}");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = new_id();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-an-id".parse::<RecordId>().is_err());
    }

    #[test]
    fn concurrent_generation_yields_distinct_ids() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1_250;

        let assigner: Arc<dyn IdAssigner> = Arc::new(TimeRandomIds);
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let assigner = Arc::clone(&assigner);
                std::thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| assigner.new_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::with_capacity(THREADS * PER_THREAD);
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
