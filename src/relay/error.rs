//! Relay failure taxonomy.
//!
//! Every layer returns an explicit `Result` with one of these kinds, so a
//! caller cannot forget a failure path. The HTTP mapping lives next to the
//! kinds: 400 for caller errors, the upstream's own status for rejections,
//! 500 for transport and internal failures.

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while relaying one request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required inbound parameter was missing or invalid.
    #[error("{0}")]
    MissingParameter(String),

    /// The upstream completed the call but reported failure.
    #[error("upstream rejected the request with status {status}: {detail}")]
    UpstreamRejected {
        status: StatusCode,
        detail: String,
        /// The upstream body, attached when it parsed as JSON.
        body: Option<Value>,
    },

    /// The outbound call itself could not complete (DNS, refused
    /// connection, timeout). Distinct from the upstream returning a
    /// non-2xx status.
    #[error("upstream transport failure: {0}")]
    Transport(String),

    /// Anything not already classified.
    #[error("internal relay error: {0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status emitted for this failure.
    pub fn http_status(&self) -> StatusCode {
        match self {
            RelayError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamRejected { status, .. } => *status,
            RelayError::Transport(_) | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short kind label used for logs and failure metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingParameter(_) => "missing_parameter",
            RelayError::UpstreamRejected { .. } => "upstream_rejected",
            RelayError::Transport(_) => "transport",
            RelayError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            RelayError::MissingParameter("x".into()).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::UpstreamRejected {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: "bad prompt".into(),
                body: None,
            }
            .http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RelayError::Transport("connection refused".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Internal("oops".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_carries_detail() {
        let err = RelayError::Transport("dns error".into());
        assert!(err.to_string().contains("dns error"));
    }
}
