//! Flow identifiers, the static route table, and tagged dispatch.
//!
//! The transport owns path matching and body decoding. It turns a matched
//! route into a [`FlowRequest`] and hands it to [`Flows::dispatch`]; nothing
//! here looks anything up by string at request time.

use crate::{
    BulkCacheWriteFlow, BulkPersistFlow, CacheReadFlow, Coordinate, DistributedCache,
    DocumentStore, GeocodingBatch, GeocodingProvider, GeocodingRecord, IdAssigner, LookupFlow,
    OperationResult, Outcome, Result, StoredQueryFlow,
};
use core::fmt;
use std::sync::Arc;

/// HTTP method of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// Every operation the service exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowId {
    Ping,
    Lookup,
    StoredQuery,
    CacheSnapshot,
    BulkPersist,
    BulkCacheWrite,
}

impl FlowId {
    pub const ALL: [FlowId; 6] = [
        FlowId::Ping,
        FlowId::Lookup,
        FlowId::StoredQuery,
        FlowId::CacheSnapshot,
        FlowId::BulkPersist,
        FlowId::BulkCacheWrite,
    ];

    /// The route this flow is mounted on.
    pub fn route(self) -> &'static Route {
        // ROUTES holds exactly one entry per FlowId, in FlowId::ALL order.
        &ROUTES[self as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            FlowId::Ping => "ping",
            FlowId::Lookup => "location",
            FlowId::StoredQuery => "mongoLocation",
            FlowId::CacheSnapshot => "listCache",
            FlowId::BulkPersist => "saveGeocoding",
            FlowId::BulkCacheWrite => "saveGeocodingToCache",
        }
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the route table. Paths are relative to the API root and use
/// `{name}` for path parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub flow: FlowId,
    pub description: &'static str,
}

impl Route {
    /// Names of the `{name}` path parameters, in path order.
    pub fn parameters(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
    }
}

pub static ROUTES: [Route; 6] = [
    Route {
        method: Method::Get,
        path: "/ping",
        flow: FlowId::Ping,
        description: "Liveness probe resolving a fixed coordinate",
    },
    Route {
        method: Method::Get,
        path: "/location/latitude/{latitude}/longitude/{longitude}",
        flow: FlowId::Lookup,
        description: "Resolve the address at a coordinate",
    },
    Route {
        method: Method::Get,
        path: "/mongoLocation/latitude/{latitude}/longitude/{longitude}",
        flow: FlowId::StoredQuery,
        description: "List stored geocodings at a coordinate",
    },
    Route {
        method: Method::Get,
        path: "/listAllFromCache",
        flow: FlowId::CacheSnapshot,
        description: "List every geocoding held in the cache",
    },
    Route {
        method: Method::Post,
        path: "/savetoMongoDB",
        flow: FlowId::BulkPersist,
        description: "Save a list of geocodings to the document store",
    },
    Route {
        method: Method::Post,
        path: "/savetoCache",
        flow: FlowId::BulkCacheWrite,
        description: "Save a list of geocodings to the cache cluster",
    },
];

/// Decoded input of one flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowRequest {
    Ping,
    Lookup(Coordinate),
    StoredQuery(Coordinate),
    CacheSnapshot,
    BulkPersist(GeocodingBatch),
    BulkCacheWrite(GeocodingBatch),
}

impl FlowRequest {
    pub fn flow(&self) -> FlowId {
        match self {
            FlowRequest::Ping => FlowId::Ping,
            FlowRequest::Lookup(_) => FlowId::Lookup,
            FlowRequest::StoredQuery(_) => FlowId::StoredQuery,
            FlowRequest::CacheSnapshot => FlowId::CacheSnapshot,
            FlowRequest::BulkPersist(_) => FlowId::BulkPersist,
            FlowRequest::BulkCacheWrite(_) => FlowId::BulkCacheWrite,
        }
    }
}

/// Answer of one flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowReply {
    Record(GeocodingRecord),
    Batch(GeocodingBatch),
    Result(OperationResult),
}

/// All flows, wired to one set of collaborators.
#[derive(Clone)]
pub struct Flows {
    pub lookup: LookupFlow,
    pub stored_query: StoredQueryFlow,
    pub cache_read: CacheReadFlow,
    pub bulk_persist: BulkPersistFlow,
    pub bulk_cache_write: BulkCacheWriteFlow,
}

impl Flows {
    pub fn new(
        provider: Arc<dyn GeocodingProvider>,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn DistributedCache>,
        ids: Arc<dyn IdAssigner>,
    ) -> Self {
        Self {
            lookup: LookupFlow::new(provider),
            stored_query: StoredQueryFlow::new(Arc::clone(&store)),
            cache_read: CacheReadFlow::new(Arc::clone(&cache)),
            bulk_persist: BulkPersistFlow::new(store, Arc::clone(&ids)),
            bulk_cache_write: BulkCacheWriteFlow::new(cache, ids),
        }
    }

    /// Runs the flow tagged by `request`.
    pub async fn dispatch(&self, request: FlowRequest) -> Result<Outcome<FlowReply>> {
        match request {
            FlowRequest::Ping => Ok(Outcome::Done(FlowReply::Record(self.lookup.ping().await?))),
            FlowRequest::Lookup(coordinate) => Ok(self
                .lookup
                .run(coordinate)
                .await?
                .map(FlowReply::Record)),
            FlowRequest::StoredQuery(coordinate) => Ok(self
                .stored_query
                .run(coordinate)
                .await?
                .map(FlowReply::Batch)),
            FlowRequest::CacheSnapshot => {
                Ok(Outcome::Done(FlowReply::Batch(self.cache_read.run().await?)))
            }
            FlowRequest::BulkPersist(batch) => Ok(self
                .bulk_persist
                .run(batch)
                .await?
                .map(FlowReply::Result)),
            FlowRequest::BulkCacheWrite(batch) => Ok(self
                .bulk_cache_write
                .run(batch)
                .await?
                .map(FlowReply::Result)),
        }
    }
}
