//! HTTP boundary subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → [relay subsystem validates, forwards, normalizes]
//!     → response.rs (payload or error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRelayRequestId, X_REQUEST_ID};
pub use server::HttpServer;
