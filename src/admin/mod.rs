//! Admin API: read-only view of kinds and live objects.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::supervisor::{Registry, Supervisor};

/// State injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub supervisor: Arc<Mutex<Supervisor>>,
    pub registry: Arc<Registry>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/objects", get(get_objects))
        .route("/admin/objects/{name}", get(get_object))
        .route("/admin/kinds", get(get_kinds))
        .route("/admin/kinds/{kind}/default-spec", get(get_default_spec))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await
}
