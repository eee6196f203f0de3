//! Narrow interfaces to the three external collaborators.
//!
//! Implementations report their own failures through [`BoxError`]; the flows
//! wrap them in [`Error::Backend`](crate::Error::Backend) without retrying or
//! translating them.

use crate::{BoxError, Coordinate, GeocodingBatch, GeocodingRecord};
use async_trait::async_trait;

/// Converts a numeric coordinate into a human-readable address.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn resolve_address(&self, latitude: f64, longitude: f64) -> Result<String, BoxError>;
}

/// Durable persistence for geocoding records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Prepares the backing collection. Called once at start-up.
    async fn ensure_collection(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Writes the whole batch in one call.
    async fn insert_batch(&self, records: &[GeocodingRecord]) -> Result<(), BoxError>;

    /// All stored records at `coordinate`. An empty batch is a normal answer.
    async fn query_by_coordinate(&self, coordinate: &Coordinate)
    -> Result<GeocodingBatch, BoxError>;
}

/// In-memory, cluster-shared record cache.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    async fn put(&self, record: &GeocodingRecord) -> Result<(), BoxError>;

    /// Full snapshot of the cache. Unbounded: proportional to its size.
    async fn list_all(&self) -> Result<GeocodingBatch, BoxError>;
}
