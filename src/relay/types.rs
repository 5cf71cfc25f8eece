//! Core data types for a single relay invocation.

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use serde_json::Value;

/// One inbound form field, classified at parse time.
///
/// A field is a `File` when the multipart part carried a filename or a
/// content type; everything else is plain `Text`. File bytes are carried
/// as-is and never transformed.
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    },
}

impl FormField {
    /// Field name as it arrived on the wire.
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } => name,
            FormField::File { name, .. } => name,
        }
    }
}

/// Payload to forward upstream.
#[derive(Debug, Clone)]
pub enum RelayBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// The outbound request, built once per inbound call and immutable after
/// construction.
///
/// `path` is either an upstream route (joined onto the configured base URL)
/// or an absolute `http(s)` URL, which is used verbatim. `headers` carries
/// auxiliary headers such as an API key; standard headers (content type,
/// multipart boundaries) are derived from `body` at send time.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub path: String,
    pub method: Method,
    pub body: RelayBody,
    pub headers: HeaderMap,
}

impl RelayRequest {
    pub fn new(method: Method, path: impl Into<String>, body: RelayBody) -> Self {
        Self {
            path: path.into(),
            method,
            body,
            headers: HeaderMap::new(),
        }
    }
}

/// The upstream's reply before normalization: status, declared content type
/// and undecoded body bytes.
#[derive(Debug, Clone)]
pub struct RawUpstream {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Decoded payload of a successful relay.
#[derive(Debug, Clone)]
pub enum RelayPayload {
    Json(Value),
    Binary { data: Bytes, content_type: String },
}

/// The uniform success shape: produced exactly once per relay invocation.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub payload: RelayPayload,
}

impl RelayResponse {
    /// Raw payload bytes, regardless of how the body decoded.
    pub fn into_bytes(self) -> Bytes {
        match self.payload {
            RelayPayload::Json(value) => Bytes::from(value.to_string()),
            RelayPayload::Binary { data, .. } => data,
        }
    }
}
