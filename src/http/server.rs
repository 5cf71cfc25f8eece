//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all relay handlers
//! - Wire up middleware (tracing, timeout, request ID, body limit, panic
//!   capture)
//! - Bind the server to a listener and serve with graceful shutdown
//!
//! # Design Decisions
//! - The upstream client is injected at construction time; tests substitute
//!   a double via `with_upstream`
//! - Handlers share one cloneable `AppState`; no mutable state is shared
//!   between in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{LimitsConfig, RelayConfig};
use crate::http::request::{MakeRelayRequestId, X_REQUEST_ID};
use crate::http::response::handle_panic;
use crate::relay::client::{HttpUpstreamClient, UpstreamClient};
use crate::relay::{handlers, Relay};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub limits: LimitsConfig,
    pub api_key: Option<String>,
}

/// HTTP server for the relay gateway.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server talking to the configured upstream.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let upstream = Arc::new(HttpUpstreamClient::new(&config.upstream, &config.timeouts)?);
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create a server with an explicit upstream client.
    pub fn with_upstream(config: RelayConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        let state = AppState {
            relay: Arc::new(Relay::new(upstream)),
            limits: config.limits.clone(),
            api_key: config.upstream.api_key.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/api/create-from-references",
                post(handlers::create_from_references),
            )
            .route("/api/im-gen", post(handlers::im_gen))
            .route(
                "/api/proxy",
                get(handlers::proxy_get).post(handlers::proxy_post),
            )
            .route("/api/proxy-image", get(handlers::proxy_image))
            .route("/api/remove-background", post(handlers::remove_background))
            .route("/api/edit-image", post(handlers::edit_image))
            .route("/api/edit-with-mask", post(handlers::edit_with_mask))
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                X_REQUEST_ID,
            )))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(X_REQUEST_ID),
                MakeRelayRequestId,
            ))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    version: &'static str,
    status: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
