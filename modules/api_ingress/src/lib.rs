//! HTTP host for the customer API: global middleware, `/health`, and the
//! listener loop. Domain crates hand their routes to [`ApiIngress::build_router`].

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

mod config;
pub mod cors;
pub mod error;
pub mod request_id;
pub mod shutdown;
pub mod web;

pub use config::ApiIngressConfig;
pub use error::{AppError, ErrorResponse};

/// Owns the HTTP server configuration and wraps domain routes with the
/// global middleware stack.
#[derive(Debug, Clone, Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    /// Adds `/health`, the JSON 404 fallback and the global middleware to `routes`.
    pub fn build_router(&self, routes: Router) -> Router {
        tracing::debug!("Building router");
        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(web::not_found);

        // Each layer wraps everything added before it, so the request passes them
        // bottom-up: CORS -> SetRequestId -> PropagateRequestId -> Trace ->
        // push_req_id_to_extensions -> BodyLimit -> handler.
        let x_request_id = crate::request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        router = router.layer(from_fn(crate::request_id::push_req_id_to_extensions));
        router = router.layer(crate::request_id::create_trace_layer());

        // Echo the id back on the response
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        // Generate x-request-id when the client did not send one
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            crate::request_id::MakeReqId,
        ));

        // Outermost, so preflights short-circuit and every response is decorated
        router.layer(from_fn(crate::cors::cors))
    }

    /// Binds `bind_addr` and serves `router` until `cancel` fires.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr = self.config.bind_addr.as_str();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on '{addr}'"))?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
