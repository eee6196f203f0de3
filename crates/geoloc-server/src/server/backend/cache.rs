//! Node-local record cache keyed by record id.

use async_trait::async_trait;
use dashmap::DashMap;
use geoloc_core::{BoxError, DistributedCache, GeocodingBatch, GeocodingRecord, RecordId};

#[derive(Debug, thiserror::Error)]
#[error("record at {latitude},{longitude} has no id")]
pub struct MissingId {
    latitude: String,
    longitude: String,
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<RecordId, GeocodingRecord>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl DistributedCache for MemoryCache {
    async fn put(&self, record: &GeocodingRecord) -> Result<(), BoxError> {
        let id = record.id.ok_or_else(|| MissingId {
            latitude: record.latitude.clone(),
            longitude: record.longitude.clone(),
        })?;
        self.entries.insert(id, record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<GeocodingBatch, BoxError> {
        Ok(self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
