//! Front-end routes of a FaaS worker.
//!
//! ```text
//! GET  /healthz                  → 200 "ok"
//! ANY  /{function}[/{*path}]     → Knative, Host: {function}.{namespace}.{suffix}
//! ```

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::provider::{Knative, ProviderError};
use super::worker::WorkerState;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::validation::rules;

/// Metrics label for requests that never reached a function.
pub const INVALID_FUNCTION: &str = "_invalid";

/// State shared by the dispatch handlers of one worker.
#[derive(Clone)]
pub struct DispatchState {
    pub provider: Arc<Knative>,
    pub worker: Arc<WorkerState>,
    pub max_body_size: usize,
}

pub fn routes(state: DispatchState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/{function}", any(dispatch))
        .route("/{function}/{*path}", any(dispatch))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn dispatch(
    State(state): State<DispatchState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let function = params.get("function").cloned().unwrap_or_default();
    let path = params.get("path").map(String::as_str).unwrap_or("");
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    state.worker.requests.fetch_add(1, Ordering::Relaxed);

    if let Err(reason) = rules::dns_label(&function) {
        tracing::debug!(request_id = %request_id, reason = %reason, "Rejected function name");
        return finish(
            &state,
            INVALID_FUNCTION,
            start,
            (StatusCode::BAD_REQUEST, reason).into_response(),
        );
    }

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!(request_id = %request_id, function = %function, "Request body too large");
            return finish(
                &state,
                INVALID_FUNCTION,
                start,
                StatusCode::PAYLOAD_TOO_LARGE.into_response(),
            );
        }
    };

    tracing::debug!(
        request_id = %request_id,
        function = %function,
        method = %parts.method,
        path = %path,
        "Dispatching request"
    );

    let upstream = match state.provider.build_request(
        &function,
        parts.method,
        path,
        parts.uri.query(),
        &parts.headers,
        body,
    ) {
        Ok(req) => req,
        Err(ProviderError::InvalidFunction(reason)) => {
            return finish(
                &state,
                INVALID_FUNCTION,
                start,
                (StatusCode::BAD_REQUEST, reason).into_response(),
            );
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream request");
            return finish(&state, &function, start, StatusCode::BAD_GATEWAY.into_response());
        }
    };

    let response = match state.provider.send(upstream).await {
        Ok(response) => response,
        Err(ProviderError::Timeout(after)) => {
            tracing::warn!(request_id = %request_id, function = %function, timeout = ?after, "Function timed out");
            (StatusCode::GATEWAY_TIMEOUT, "Function timed out").into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, function = %function, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Function invocation failed").into_response()
        }
    };

    finish(&state, &function, start, response)
}

/// Count the outcome. `label` is either a validated function name or
/// [`INVALID_FUNCTION`].
fn finish(state: &DispatchState, label: &str, start: Instant, response: Response) -> Response {
    let status = response.status();
    if !status.is_success() {
        state.worker.failures.fetch_add(1, Ordering::Relaxed);
    }
    metrics::record_request(label, status.as_u16(), start);
    response
}
