//! Request identity.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every inbound call
//! - Propagate the ID to the response so clients can correlate logs
//!
//! # Design Decisions
//! - The ID is added as early as possible so every log line carries it
//! - An inbound `x-request-id` supplied by the caller is kept as-is

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// `MakeRequestId` implementation producing UUID v4 identifiers.
#[derive(Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}
