//! HTTP Relay Gateway Library
//!
//! Fronts an AI image-generation backend: accepts inbound requests on a
//! fixed set of routes, forwards each to the configured upstream, and
//! normalizes the reply into a uniform response or error envelope.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError, UpstreamClient};
