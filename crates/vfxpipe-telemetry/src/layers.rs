//! `x-request-id` middleware for the HTTP surface.
//!
//! Requests arriving without an identifier get a fresh UUID; the identifier is
//! echoed back on the response so orchestrators can correlate ingestion calls
//! with server logs.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the per-request correlation identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer that assigns an `x-request-id` when the caller did not supply one.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
