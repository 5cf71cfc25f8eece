//! Upstream response normalization.
//!
//! Converts a raw upstream reply into the uniform success shape or a
//! classified rejection. Decoding never aborts the relay: a malformed body
//! degrades to a passthrough (on success) or to a synthesized detail
//! message (on failure).

use axum::http::StatusCode;
use serde_json::Value;

use crate::relay::error::RelayError;
use crate::relay::types::{RawUpstream, RelayPayload, RelayResponse};

/// Normalize one upstream reply.
///
/// Status in [200,299]: decode as JSON when the content type says JSON,
/// otherwise pass the bytes through untouched. Any other status becomes
/// `UpstreamRejected` with the status propagated unchanged and a detail
/// extracted from the body when possible.
pub fn normalize(raw: RawUpstream) -> Result<RelayResponse, RelayError> {
    if raw.status.is_success() {
        let content_type = raw
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if is_json(&content_type) {
            match serde_json::from_slice::<Value>(&raw.body) {
                Ok(value) => {
                    return Ok(RelayResponse {
                        status: raw.status,
                        payload: RelayPayload::Json(value),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        status = raw.status.as_u16(),
                        error = %e,
                        "Upstream declared JSON but body failed to parse, passing bytes through"
                    );
                }
            }
        }

        return Ok(RelayResponse {
            status: raw.status,
            payload: RelayPayload::Binary {
                data: raw.body,
                content_type,
            },
        });
    }

    let parsed: Option<Value> = serde_json::from_slice(&raw.body).ok();
    let detail = parsed
        .as_ref()
        .and_then(|body| body.get("detail").or_else(|| body.get("message")))
        .map(|field| match field.as_str() {
            Some(s) => s.to_string(),
            // FastAPI-style validation errors carry a structured detail
            None => field.to_string(),
        })
        .unwrap_or_else(|| fallback_detail(raw.status));

    Err(RelayError::UpstreamRejected {
        status: raw.status,
        detail,
        body: parsed,
    })
}

/// True when a content type indicates a JSON body.
fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn fallback_detail(status: StatusCode) -> String {
    format!(
        "Backend returned {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}
