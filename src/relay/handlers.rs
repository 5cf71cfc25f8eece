//! One handler per relay operation.
//!
//! Every operation follows the same shape: validate the inbound parameters
//! (missing parameter means 400 and the upstream is never called), build the
//! outbound request preserving field names and attachments, forward,
//! normalize, emit. The generic proxy forwards the caller-supplied
//! `endpoint` onto the upstream host without an allowlist.

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::http::response::{image_attachment, relay_response};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::multipart::{
    collect_fields, log_field_summary, require_file, require_text, validate_image,
};
use crate::relay::types::{FormField, RelayBody, RelayRequest};

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProxyImageParams {
    pub url: Option<String>,
}

/// Run multipart extraction with the rejection mapped into the relay error
/// taxonomy, so even a missing boundary answers with the JSON envelope.
async fn ingest(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<FormField>, RelayError> {
    match multipart {
        Ok(multipart) => collect_fields(multipart).await,
        Err(rejection) => Err(RelayError::MissingParameter(format!(
            "Malformed multipart body: {rejection}"
        ))),
    }
}

/// POST /api/create-from-references → upstream POST /create-from-references
pub async fn create_from_references(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let fields = match ingest(multipart).await {
        Ok(fields) => fields,
        Err(err) => return reject("create-from-references", started, err),
    };

    let request = RelayRequest::new(
        Method::POST,
        "/create-from-references",
        RelayBody::Multipart(fields),
    );
    run(&state, "create-from-references", started, request).await
}

/// POST /api/im-gen → upstream POST /im-gen
pub async fn im_gen(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return reject(
                "im-gen",
                started,
                RelayError::MissingParameter("Request body must be valid JSON".to_string()),
            );
        }
    };

    let request = RelayRequest::new(Method::POST, "/im-gen", RelayBody::Json(payload));
    run(&state, "im-gen", started, request).await
}

/// GET /api/proxy?endpoint=X → upstream GET X
pub async fn proxy_get(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let started = Instant::now();
    let Some(endpoint) = params.endpoint.filter(|e| !e.is_empty()) else {
        return reject(
            "proxy",
            started,
            RelayError::MissingParameter("Endpoint parameter is required".to_string()),
        );
    };

    let request = RelayRequest::new(Method::GET, endpoint, RelayBody::Empty);
    run(&state, "proxy", started, request).await
}

/// POST /api/proxy?endpoint=X → upstream POST X with the inbound form
pub async fn proxy_post(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let Some(endpoint) = params.endpoint.filter(|e| !e.is_empty()) else {
        return reject(
            "proxy",
            started,
            RelayError::MissingParameter("Endpoint parameter is required".to_string()),
        );
    };

    let fields = match ingest(multipart).await {
        Ok(fields) => fields,
        Err(err) => return reject("proxy", started, err),
    };

    let request = RelayRequest::new(Method::POST, endpoint, RelayBody::Multipart(fields));
    run(&state, "proxy", started, request).await
}

/// GET /api/proxy-image?url=X → fetch X, return the bytes as a PNG download.
///
/// Failures still answer with the JSON envelope, so callers must branch on
/// the status code before treating the body as an image.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ProxyImageParams>,
) -> Response {
    let started = Instant::now();
    let Some(url) = params.url.filter(|u| !u.is_empty()) else {
        return reject(
            "proxy-image",
            started,
            RelayError::MissingParameter("Missing image URL parameter".to_string()),
        );
    };

    let mut request = RelayRequest::new(Method::GET, url, RelayBody::Empty);
    if let Some(key) = &state.api_key {
        match HeaderValue::from_str(key) {
            Ok(value) => {
                request
                    .headers
                    .insert(HeaderName::from_static("api-key"), value);
            }
            Err(_) => {
                return reject(
                    "proxy-image",
                    started,
                    RelayError::Internal(
                        "configured api key is not a valid header value".to_string(),
                    ),
                );
            }
        }
    }

    match state.relay.execute(request).await {
        Ok(response) => {
            metrics::record_relay("proxy-image", response.status.as_u16(), started);
            image_attachment(response)
        }
        Err(err) => reject("proxy-image", started, err),
    }
}

/// POST /api/remove-background → upstream POST /generate/
pub async fn remove_background(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let fields = match ingest(multipart).await {
        Ok(fields) => fields,
        Err(err) => return reject("remove-background", started, err),
    };

    if let Err(err) = require_file(&fields, "image", "No image provided") {
        return reject("remove-background", started, err);
    }

    let request = RelayRequest::new(Method::POST, "/generate/", RelayBody::Multipart(fields));
    run(&state, "remove-background", started, request).await
}

/// POST /api/edit-image → upstream POST /edit-image
pub async fn edit_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let fields = match ingest(multipart).await {
        Ok(fields) => fields,
        Err(err) => return reject("edit-image", started, err),
    };

    log_field_summary("edit-image", &fields);

    let validated = require_file(&fields, "image", "No image provided")
        .and_then(|image| validate_image(image, &state.limits))
        .and_then(|()| require_text(&fields, "prompt", "No prompt provided").map(|_| ()));
    if let Err(err) = validated {
        return reject("edit-image", started, err);
    }

    let request = RelayRequest::new(Method::POST, "/edit-image", RelayBody::Multipart(fields));
    run(&state, "edit-image", started, request).await
}

/// POST /api/edit-with-mask → upstream POST /edit-with-mask
pub async fn edit_with_mask(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let fields = match ingest(multipart).await {
        Ok(fields) => fields,
        Err(err) => return reject("edit-with-mask", started, err),
    };

    let request = RelayRequest::new(Method::POST, "/edit-with-mask", RelayBody::Multipart(fields));
    run(&state, "edit-with-mask", started, request).await
}

/// Forward, normalize, and emit with the payload's own status code.
async fn run(
    state: &AppState,
    operation: &'static str,
    started: Instant,
    request: RelayRequest,
) -> Response {
    tracing::debug!(
        operation,
        method = %request.method,
        path = %request.path,
        "Relaying request"
    );

    match state.relay.execute(request).await {
        Ok(response) => {
            metrics::record_relay(operation, response.status.as_u16(), started);
            relay_response(response)
        }
        Err(err) => reject(operation, started, err),
    }
}

fn reject(operation: &'static str, started: Instant, err: RelayError) -> Response {
    tracing::warn!(operation, kind = err.kind(), error = %err, "Relay failed");
    metrics::record_relay(operation, err.http_status().as_u16(), started);
    metrics::record_failure(operation, err.kind());
    err.into_response()
}
