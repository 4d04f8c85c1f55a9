//! HTTP server setup shared by objects exposing a front-end listener.
//!
//! # Responsibilities
//! - Wrap an object's routes with the common middleware stack
//!   (request ID, tracing, request timeout)
//! - Serve on an already-bound listener
//! - Stop accepting and drain when the shutdown signal fires

use axum::{
    http::{HeaderName, Request, StatusCode},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::duration::{parse_duration, DurationError};
use crate::http::spec::HttpServerSpec;
use crate::lifecycle::shutdown::ShutdownSignal;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID when the client did not send one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// HTTP server for a single object generation.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wrap `routes` with the middleware configured by `spec`.
    pub fn new(spec: &HttpServerSpec, routes: Router) -> Result<Self, DurationError> {
        let request_timeout = parse_duration(&spec.request_timeout)?;
        let router = Self::build_router(routes, request_timeout);
        Ok(Self { router })
    }

    fn build_router(routes: Router, request_timeout: Duration) -> Router {
        let header = HeaderName::from_static(X_REQUEST_ID);
        routes.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(header))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
    }

    /// Serve until `shutdown` fires, then drain in-flight connections.
    ///
    /// The listener is dropped before this returns.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}
