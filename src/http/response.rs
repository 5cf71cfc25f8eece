//! Outbound response rendering.
//!
//! # Responsibilities
//! - Render a normalized upstream payload (JSON or bytes) to the client
//! - Render every `RelayError` as the uniform JSON envelope
//! - Force download semantics for relayed images
//! - Map captured panics to the internal-error envelope
//!
//! # Design Decisions
//! - Binary operations still answer failures with the JSON envelope, so
//!   callers branch on status before decoding bytes
//! - Envelope fields absent rather than null when unused

use std::any::Any;

use axum::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::relay::error::RelayError;
use crate::relay::types::{RelayPayload, RelayResponse};

/// JSON body returned for every failed relay call.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_error: Option<Value>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let http_status = self.http_status();
        let envelope = match self {
            RelayError::MissingParameter(message) => ErrorEnvelope {
                error: message,
                detail: None,
                status: None,
                backend_error: None,
            },
            RelayError::UpstreamRejected {
                status,
                detail,
                body,
            } => ErrorEnvelope {
                error: "Backend processing failed".to_string(),
                detail: Some(detail),
                status: Some(status.as_u16()),
                backend_error: body,
            },
            RelayError::Transport(detail) => ErrorEnvelope {
                error: "Failed to reach image backend".to_string(),
                detail: Some(detail),
                status: None,
                backend_error: None,
            },
            RelayError::Internal(detail) => ErrorEnvelope {
                error: "Relay request failed".to_string(),
                detail: Some(detail),
                status: None,
                backend_error: None,
            },
        };

        (http_status, Json(envelope)).into_response()
    }
}

/// Render a normalized upstream reply with its own status code.
pub fn relay_response(response: RelayResponse) -> Response {
    match response.payload {
        RelayPayload::Json(value) => (response.status, Json(value)).into_response(),
        RelayPayload::Binary { data, content_type } => {
            (response.status, [(CONTENT_TYPE, content_type)], data).into_response()
        }
    }
}

/// Render relayed image bytes as a PNG download.
pub fn image_attachment(response: RelayResponse) -> Response {
    let status = response.status;
    let bytes = response.into_bytes();
    (
        status,
        [
            (CONTENT_TYPE, "image/png"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"generated-image.png\"",
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Convert a captured panic into the internal-error envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unexpected panic".to_string()
    };

    tracing::error!(detail = %detail, "Handler panicked");
    RelayError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_parameter_envelope_has_only_error() {
        let response =
            RelayError::MissingParameter("Endpoint parameter is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Endpoint parameter is required"})
        );
    }

    #[tokio::test]
    async fn test_upstream_rejection_mirrors_status_and_attaches_body() {
        let response = RelayError::UpstreamRejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: "bad prompt".into(),
            body: Some(json!({"detail": "bad prompt"})),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Backend processing failed",
                "detail": "bad prompt",
                "status": 422,
                "backend_error": {"detail": "bad prompt"},
            })
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_500_with_detail() {
        let response = RelayError::Transport("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to reach image backend");
        assert_eq!(body["detail"], "connection refused");
    }

    #[tokio::test]
    async fn test_image_attachment_headers() {
        let response = image_attachment(RelayResponse {
            status: StatusCode::OK,
            payload: RelayPayload::Binary {
                data: bytes::Bytes::from_static(&[0x89, 0x50, 0x4e, 0x47]),
                content_type: "image/png".into(),
            },
        });

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"generated-image.png\""
        );
    }
}
