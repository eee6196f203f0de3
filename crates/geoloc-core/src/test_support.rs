//! Recording collaborator stubs for exercising flows without real backends.

use crate::{
    BoxError, Coordinate, DistributedCache, DocumentStore, GeocodingBatch, GeocodingProvider,
    GeocodingRecord,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Provider answering every lookup with a fixed address, or a fixed failure.
#[derive(Debug, Default)]
pub struct StubProvider {
    answer: Option<String>,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl StubProvider {
    pub fn answering(address: impl Into<String>) -> Self {
        Self {
            answer: Some(address.into()),
            calls: Mutex::default(),
        }
    }

    /// A provider whose every call fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GeocodingProvider for StubProvider {
    async fn resolve_address(&self, latitude: f64, longitude: f64) -> Result<String, BoxError> {
        self.calls.lock().push((latitude, longitude));
        self.answer
            .clone()
            .ok_or_else(|| "provider unreachable".into())
    }
}

/// Store that records every call and answers queries from what was inserted.
#[derive(Debug, Default)]
pub struct RecordingStore {
    failing: bool,
    inserts: Mutex<Vec<Vec<GeocodingRecord>>>,
    queries: Mutex<Vec<Coordinate>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Each `insert_batch` call, in order.
    pub fn inserts(&self) -> Vec<Vec<GeocodingRecord>> {
        self.inserts.lock().clone()
    }

    pub fn queries(&self) -> Vec<Coordinate> {
        self.queries.lock().clone()
    }

    fn check(&self) -> Result<(), BoxError> {
        if self.failing {
            return Err("store unreachable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn insert_batch(&self, records: &[GeocodingRecord]) -> Result<(), BoxError> {
        self.check()?;
        self.inserts.lock().push(records.to_vec());
        Ok(())
    }

    async fn query_by_coordinate(
        &self,
        coordinate: &Coordinate,
    ) -> Result<GeocodingBatch, BoxError> {
        self.queries.lock().push(coordinate.clone());
        self.check()?;
        Ok(self
            .inserts
            .lock()
            .iter()
            .flatten()
            .filter(|record| record.matches(coordinate))
            .cloned()
            .collect())
    }
}

/// Cache that records every `put`, optionally failing from the n-th one on.
#[derive(Debug, Default)]
pub struct RecordingCache {
    fail_from: Option<usize>,
    puts: Mutex<Vec<GeocodingRecord>>,
    attempts: Mutex<usize>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose `put` calls fail once `n` of them have succeeded.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_from: Some(n),
            ..Self::default()
        }
    }

    /// Successful `put` calls, in order.
    pub fn puts(&self) -> Vec<GeocodingRecord> {
        self.puts.lock().clone()
    }

    /// Every `put` call, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl DistributedCache for RecordingCache {
    async fn put(&self, record: &GeocodingRecord) -> Result<(), BoxError> {
        *self.attempts.lock() += 1;
        let mut puts = self.puts.lock();
        if self.fail_from.is_some_and(|n| puts.len() >= n) {
            return Err("cache member unreachable".into());
        }
        puts.push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<GeocodingBatch, BoxError> {
        Ok(self.puts.lock().iter().cloned().collect())
    }
}
