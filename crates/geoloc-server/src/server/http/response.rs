//! Mapping of flow answers onto HTTP responses.
//!
//! - `Done` answers are `200` with the record, batch or result as JSON.
//! - `Rejected` answers are `400` with the JSON [`ErrorPayload`].
//! - Collaborator failures are `502` with an [`ErrorPayload`] carrying the
//!   collaborator's own message.
//! - Undecodable bodies are `400` with a `text/plain` body, produced before any
//!   flow runs.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use geoloc_core::{ErrorPayload, FlowReply, Outcome};

pub const INVALID_JSON_BODY: &str = "Invalid json data";

/// The result of one dispatched flow, ready to be written to the wire.
pub struct FlowResponse(pub geoloc_core::Result<Outcome<FlowReply>>);

impl IntoResponse for FlowResponse {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(Outcome::Done(FlowReply::Record(record))) => Json(record).into_response(),
            Ok(Outcome::Done(FlowReply::Batch(batch))) => Json(batch).into_response(),
            Ok(Outcome::Done(FlowReply::Result(result))) => Json(result).into_response(),
            Ok(Outcome::Rejected(payload)) => {
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            }
            Err(err) => {
                tracing::error!(backend = %err.backend(), "{err}");
                (StatusCode::BAD_GATEWAY, Json(ErrorPayload::from(&err))).into_response()
            }
        }
    }
}

/// Response for a body that could not be decoded as the expected JSON.
pub fn invalid_json(rejection: &JsonRejection) -> Response {
    tracing::debug!(reason = %rejection.body_text(), "rejecting request body");
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain")],
        INVALID_JSON_BODY,
    )
        .into_response()
}
