//! Outbound HTTP client for the upstream image-generation service.
//!
//! # Responsibilities
//! - Issue exactly one outbound call per `forward` (no automatic retry)
//! - Re-emit multipart fields with untouched bytes
//! - Serialize JSON bodies with a stable encoder
//! - Enforce the configured upstream timeout
//! - Classify network-level failures as transport errors
//!
//! # Design Decisions
//! - `UpstreamClient` is a trait so handlers take an `Arc<dyn UpstreamClient>`
//!   and tests substitute a double
//! - Relative paths are concatenated onto the configured base URL; absolute
//!   `http(s)` URLs are used verbatim (remote image fetch)
//! - A non-2xx upstream status is a normal `RawUpstream`, never a transport
//!   failure

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::relay::error::RelayError;
use crate::relay::types::{FormField, RawUpstream, RelayBody, RelayRequest};

/// One outbound network call, or a classified transport failure.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn forward(&self, request: RelayRequest) -> Result<RawUpstream, RelayError>;
}

/// Production client backed by `reqwest`.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpUpstreamClient {
    /// Build a client for the configured upstream. The timeout covers the
    /// whole call: connect, send, and reading the response body.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeouts.upstream_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeouts.upstream_secs,
        })
    }

    /// Resolve the target URL for a relay path.
    fn target_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            return RelayError::Transport(format!(
                "upstream call timed out after {}s",
                self.timeout_secs
            ));
        }

        // reqwest's top-level message omits the cause; walk the chain so
        // "connection refused" and friends reach the caller.
        let mut detail = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        RelayError::Transport(detail)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn forward(&self, request: RelayRequest) -> Result<RawUpstream, RelayError> {
        let url = self.target_url(&request.path);

        tracing::debug!(
            method = %request.method,
            url = %url,
            "Forwarding to upstream"
        );

        let mut builder = self.client.request(request.method, url);

        builder = match request.body {
            RelayBody::Empty => builder,
            RelayBody::Json(value) => builder.json(&value),
            RelayBody::Multipart(fields) => {
                let mut form = reqwest::multipart::Form::new();
                for field in fields {
                    match field {
                        FormField::Text { name, value } => {
                            form = form.text(name, value);
                        }
                        FormField::File {
                            name,
                            filename,
                            content_type,
                            data,
                        } => {
                            let len = data.len() as u64;
                            let mut part = reqwest::multipart::Part::stream_with_length(
                                reqwest::Body::from(data),
                                len,
                            );
                            if let Some(filename) = filename {
                                part = part.file_name(filename);
                            }
                            if let Some(content_type) = content_type {
                                part = part.mime_str(&content_type).map_err(|e| {
                                    RelayError::Internal(format!(
                                        "invalid part content type {content_type:?}: {e}"
                                    ))
                                })?;
                            }
                            form = form.part(name, part);
                        }
                    }
                }
                builder.multipart(form)
            }
        };

        builder = builder.headers(request.headers);

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        Ok(RawUpstream {
            status,
            content_type,
            body,
        })
    }
}
