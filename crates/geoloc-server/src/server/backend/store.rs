//! In-process document store.
//!
//! Records live in insertion order behind a single `RwLock`. A whole batch is
//! appended under one write lock, so concurrent readers never observe half of
//! a batch.

use async_trait::async_trait;
use geoloc_core::{BoxError, Coordinate, DocumentStore, GeocodingBatch, GeocodingRecord};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<GeocodingRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<(), BoxError> {
        tracing::info!(records = self.len(), "document store collection ready");
        Ok(())
    }

    async fn insert_batch(&self, records: &[GeocodingRecord]) -> Result<(), BoxError> {
        self.records.write().extend_from_slice(records);
        Ok(())
    }

    async fn query_by_coordinate(
        &self,
        coordinate: &Coordinate,
    ) -> Result<GeocodingBatch, BoxError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|record| record.matches(coordinate))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_core::new_id;

    fn stored(latitude: &str, longitude: &str, address: &str) -> GeocodingRecord {
        let mut record = GeocodingRecord::at(Coordinate::new(latitude, longitude)).with_address(address);
        record.id = Some(new_id());
        record
    }

    #[tokio::test]
    async fn query_returns_every_record_at_the_coordinate() {
        let store = MemoryStore::new();
        store.ensure_collection().await.unwrap();
        store
            .insert_batch(&[stored("1", "2", "a"), stored("1", "3", "b")])
            .await
            .unwrap();
        store.insert_batch(&[stored("1", "2", "c")]).await.unwrap();

        let found = store
            .query_by_coordinate(&Coordinate::new("1", "2"))
            .await
            .unwrap();

        let addresses: Vec<_> = found.iter().filter_map(|r| r.address.as_deref()).collect();
        assert_eq!(addresses, ["a", "c"]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn query_without_match_is_empty() {
        let store = MemoryStore::new();
        let found = store
            .query_by_coordinate(&Coordinate::new("5", "5"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
