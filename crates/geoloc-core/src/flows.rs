//! Validated request-to-collaborator orchestration paths.
//!
//! Every flow follows the same shape: validate, then either answer with
//! [`Outcome::Rejected`] or call exactly one collaborator and answer with
//! [`Outcome::Done`]. Collaborator failures come back as [`Error`] and are not
//! retried.
//!
//! Flows hold their collaborators behind `Arc` and carry no mutable state,
//! so a single instance serves any number of concurrent requests.

use crate::{
    Coordinate, DistributedCache, DocumentStore, Error, ErrorPayload, GeocodingBatch,
    GeocodingProvider, GeocodingRecord, IdAssigner, OperationResult, Result,
    validate::{is_batch_valid, parse_pair},
};
use std::sync::Arc;

/// Fixed coordinate answered by the liveness probe.
pub const PING_LATITUDE: f64 = 33.969601;
pub const PING_LONGITUDE: f64 = -84.100033;

pub const STORE_SAVED_MSG: &str = "Message successfully saved to mongodb!";
pub const CACHE_SAVED_MSG: &str = "Message successfully saved to cache!";

/// Two-variant result of a flow: the answer, or the structured rejection of
/// invalid input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Rejected(ErrorPayload),
}

impl<T> Outcome<T> {
    pub(crate) fn invalid() -> Self {
        Outcome::Rejected(ErrorPayload::invalid_coordinates())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Rejected(payload) => Outcome::Rejected(payload),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejected(self) -> Option<ErrorPayload> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Rejected(payload) => Some(payload),
        }
    }
}

/// Resolves a single coordinate to an address through the external provider.
/// Never persists.
#[derive(Clone)]
pub struct LookupFlow {
    provider: Arc<dyn GeocodingProvider>,
}

impl LookupFlow {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn run(&self, coordinate: Coordinate) -> Result<Outcome<GeocodingRecord>> {
        let Some((latitude, longitude)) = parse_pair(&coordinate.latitude, &coordinate.longitude)
        else {
            #[cfg(feature = "tracing")]
            tracing::debug!("rejecting lookup with invalid coordinate");
            return Ok(Outcome::invalid());
        };

        let address = self
            .provider
            .resolve_address(latitude, longitude)
            .await
            .map_err(Error::provider)?;

        Ok(Outcome::Done(
            GeocodingRecord::at(coordinate).with_address(address),
        ))
    }

    /// Liveness probe: resolves a constant coordinate, skipping validation.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn ping(&self) -> Result<GeocodingRecord> {
        let coordinate = Coordinate::new(PING_LATITUDE.to_string(), PING_LONGITUDE.to_string());
        let address = self
            .provider
            .resolve_address(PING_LATITUDE, PING_LONGITUDE)
            .await
            .map_err(Error::provider)?;
        Ok(GeocodingRecord::at(coordinate).with_address(address))
    }
}

/// Reads stored records at a single coordinate from the document store.
#[derive(Clone)]
pub struct StoredQueryFlow {
    store: Arc<dyn DocumentStore>,
}

impl StoredQueryFlow {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn run(&self, coordinate: Coordinate) -> Result<Outcome<GeocodingBatch>> {
        if parse_pair(&coordinate.latitude, &coordinate.longitude).is_none() {
            return Ok(Outcome::invalid());
        }

        let query = GeocodingRecord::at(coordinate);
        let found = self
            .store
            .query_by_coordinate(&query.coordinate())
            .await
            .map_err(Error::store)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(found = found.len(), "document store query completed");
        Ok(Outcome::Done(found))
    }
}

/// Lists everything currently held in the distributed cache.
#[derive(Clone)]
pub struct CacheReadFlow {
    cache: Arc<dyn DistributedCache>,
}

impl CacheReadFlow {
    pub fn new(cache: Arc<dyn DistributedCache>) -> Self {
        Self { cache }
    }

    /// Full scan: the answer grows with the cache, there is no paging.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn run(&self) -> Result<GeocodingBatch> {
        self.cache.list_all().await.map_err(Error::cache)
    }
}

/// Stamps ids on a batch and writes it to the document store in one call.
#[derive(Clone)]
pub struct BulkPersistFlow {
    store: Arc<dyn DocumentStore>,
    ids: Arc<dyn IdAssigner>,
}

impl BulkPersistFlow {
    pub fn new(store: Arc<dyn DocumentStore>, ids: Arc<dyn IdAssigner>) -> Self {
        Self { store, ids }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(records = batch.len())))]
    pub async fn run(&self, mut batch: GeocodingBatch) -> Result<Outcome<OperationResult>> {
        if !is_batch_valid(&batch) {
            return Ok(Outcome::invalid());
        }

        for record in &mut batch.list {
            record.id = Some(self.ids.new_id());
        }

        self.store
            .insert_batch(batch.as_slice())
            .await
            .map_err(Error::store)?;

        #[cfg(feature = "tracing")]
        tracing::info!("insert to document store completed");
        Ok(Outcome::Done(OperationResult::ok(batch, STORE_SAVED_MSG)))
    }
}

/// Stamps ids on a batch and writes each record to the cache individually.
///
/// Writes run in batch order. The first failing write ends the flow with its
/// error; records already written stay in the cache.
#[derive(Clone)]
pub struct BulkCacheWriteFlow {
    cache: Arc<dyn DistributedCache>,
    ids: Arc<dyn IdAssigner>,
}

impl BulkCacheWriteFlow {
    pub fn new(cache: Arc<dyn DistributedCache>, ids: Arc<dyn IdAssigner>) -> Self {
        Self { cache, ids }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(records = batch.len())))]
    pub async fn run(&self, mut batch: GeocodingBatch) -> Result<Outcome<OperationResult>> {
        if !is_batch_valid(&batch) {
            return Ok(Outcome::invalid());
        }

        for record in &mut batch.list {
            record.id = Some(self.ids.new_id());
            self.cache.put(record).await.map_err(Error::cache)?;
        }

        #[cfg(feature = "tracing")]
        tracing::info!("insert to cache completed");
        Ok(Outcome::Done(OperationResult::ok(batch, CACHE_SAVED_MSG)))
    }
}
