//! One handler per flow. Each decodes its input, builds the matching
//! [`FlowRequest`] and dispatches it.

use super::{
    AppState,
    response::{FlowResponse, invalid_json},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use geoloc_core::{Coordinate, FlowRequest, GeocodingBatch};

pub async fn ping(State(state): State<AppState>) -> FlowResponse {
    state.dispatch(FlowRequest::Ping).await
}

pub async fn lookup(
    State(state): State<AppState>,
    Path(coordinate): Path<Coordinate>,
) -> FlowResponse {
    state.dispatch(FlowRequest::Lookup(coordinate)).await
}

pub async fn stored_query(
    State(state): State<AppState>,
    Path(coordinate): Path<Coordinate>,
) -> FlowResponse {
    state.dispatch(FlowRequest::StoredQuery(coordinate)).await
}

pub async fn cache_snapshot(State(state): State<AppState>) -> FlowResponse {
    state.dispatch(FlowRequest::CacheSnapshot).await
}

pub async fn bulk_persist(
    State(state): State<AppState>,
    body: Result<Json<GeocodingBatch>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(batch)) => state
            .dispatch(FlowRequest::BulkPersist(batch))
            .await
            .into_response(),
        Err(rejection) => invalid_json(&rejection),
    }
}

pub async fn bulk_cache_write(
    State(state): State<AppState>,
    body: Result<Json<GeocodingBatch>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(batch)) => state
            .dispatch(FlowRequest::BulkCacheWrite(batch))
            .await
            .into_response(),
        Err(rejection) => invalid_json(&rejection),
    }
}
