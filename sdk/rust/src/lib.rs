//! Typed client for the image relay gateway.

pub mod client;

pub use client::{GenerateRequest, HealthStatus, RelayClient};
