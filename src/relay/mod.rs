//! Relay subsystem: forward one inbound request upstream and normalize the
//! reply.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → handlers.rs (validate parameters, build RelayRequest)
//!     → client.rs (one outbound call, no retry)
//!     → normalize.rs (decode success, classify failure)
//!     → http/response.rs (emit payload or error envelope)
//! ```
//!
//! # Design Decisions
//! - Every layer returns an explicit Result; no failure propagates as an
//!   unhandled fault
//! - Each invocation is stateless: nothing survives past the response
//! - One inbound call maps to at most one outbound call

pub mod client;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod normalize;
pub mod types;

use std::sync::Arc;

pub use client::{HttpUpstreamClient, UpstreamClient};
pub use error::RelayError;
pub use types::{FormField, RawUpstream, RelayBody, RelayPayload, RelayRequest, RelayResponse};

/// The relay core: owns the upstream seam and runs forward + normalize.
pub struct Relay {
    upstream: Arc<dyn UpstreamClient>,
}

impl Relay {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }

    /// Execute one relay invocation. Exactly one `RelayResponse` or exactly
    /// one `RelayError` per call.
    pub async fn execute(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let raw = self.upstream.forward(request).await?;
        normalize::normalize(raw)
    }
}
