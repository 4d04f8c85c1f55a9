//! FaaS worker: one front-end listener plus a provider sync loop.
//!
//! A worker is bound to exactly one spec generation. Construction binds the
//! listener before returning, so a port conflict fails the generation.
//! [`Worker::close`] returns only after both tasks have exited and the
//! listener has been dropped.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time;

use super::dispatch::{self, DispatchState};
use super::provider::{Knative, ProviderError};
use super::spec::Admin;
use crate::duration::{parse_duration, DurationError};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::net::listener::{self, ListenerError};
use crate::observability::metrics;
use crate::supervisor::Spec;

/// Errors raised while bringing a worker up.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid syncInterval: {0}")]
    SyncInterval(#[source] DurationError),

    #[error("invalid httpServer.requestTimeout: {0}")]
    RequestTimeout(#[source] DurationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("listener has no local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Outcome of the latest provider sync.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub syncs: u64,
    pub backend_reachable: bool,
    pub last_sync: Option<u64>,
}

/// Counters shared between the worker and its tasks.
#[derive(Debug, Default)]
pub struct WorkerState {
    pub requests: AtomicU64,
    pub failures: AtomicU64,
    sync: ArcSwap<SyncSnapshot>,
}

impl WorkerState {
    pub fn sync(&self) -> Arc<SyncSnapshot> {
        self.sync.load_full()
    }
}

/// Runtime status reported through the controller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub name: String,
    pub generation: u64,
    pub provider: String,
    pub address: String,
    pub requests: u64,
    pub failures: u64,
    #[serde(flatten)]
    pub sync: SyncSnapshot,
}

/// The live worker of one controller generation.
pub struct Worker {
    name: String,
    generation: u64,
    spec: Arc<Admin>,
    local_addr: SocketAddr,
    state: Arc<WorkerState>,
    shutdown: Shutdown,
    server: JoinHandle<Result<(), std::io::Error>>,
    syncer: JoinHandle<()>,
}

impl Worker {
    /// Bind the listener and start serving `spec`.
    pub async fn start(super_spec: &Spec, spec: Arc<Admin>) -> Result<Self, WorkerError> {
        let sync_interval = parse_duration(&spec.sync_interval).map_err(WorkerError::SyncInterval)?;
        if sync_interval.is_zero() {
            return Err(WorkerError::SyncInterval(DurationError::Malformed(
                spec.sync_interval.clone(),
            )));
        }

        let provider = Arc::new(Knative::new(&spec.knative)?);
        let state = Arc::new(WorkerState::default());

        let routes = dispatch::routes(DispatchState {
            provider: provider.clone(),
            worker: state.clone(),
            max_body_size: spec.http_server.client_max_body_size,
        });
        let server = HttpServer::new(&spec.http_server, routes).map_err(WorkerError::RequestTimeout)?;

        let listener = listener::bind(&spec.http_server).await?;
        let local_addr = listener.local_addr().map_err(WorkerError::LocalAddr)?;

        let shutdown = Shutdown::new();
        let server = tokio::spawn(server.run(listener, shutdown.subscribe()));
        let syncer = tokio::spawn(sync_loop(
            super_spec.name().to_string(),
            provider,
            state.clone(),
            sync_interval,
            shutdown.subscribe(),
        ));

        tracing::info!(
            name = %super_spec.name(),
            generation = super_spec.generation(),
            provider = %spec.provider,
            address = %local_addr,
            sync_interval = ?sync_interval,
            "FaaS worker started"
        );

        Ok(Self {
            name: super_spec.name().to_string(),
            generation: super_spec.generation(),
            spec,
            local_addr,
            state,
            shutdown,
            server,
            syncer,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn spec(&self) -> &Arc<Admin> {
        &self.spec
    }

    pub fn status(&self) -> WorkerStatus {
        WorkerStatus {
            name: self.name.clone(),
            generation: self.generation,
            provider: self.spec.provider.to_string(),
            address: self.local_addr.to_string(),
            requests: self.state.requests.load(Ordering::Relaxed),
            failures: self.state.failures.load(Ordering::Relaxed),
            sync: (*self.state.sync()).clone(),
        }
    }

    /// Stop serving and wait until every resource is released.
    pub async fn close(mut self) {
        self.shutdown.trigger();

        match (&mut self.server).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(name = %self.name, error = %e, "HTTP server exited with error"),
            Err(e) => tracing::error!(name = %self.name, error = %e, "HTTP server task failed"),
        }
        if let Err(e) = (&mut self.syncer).await {
            tracing::error!(name = %self.name, error = %e, "Sync task failed");
        }

        tracing::info!(
            name = %self.name,
            generation = self.generation,
            address = %self.local_addr,
            "FaaS worker closed"
        );
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Tasks of a worker dropped without close still stop, just not synchronously.
        self.shutdown.trigger();
    }
}

async fn sync_loop(
    name: String,
    provider: Arc<Knative>,
    state: Arc<WorkerState>,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reachable = tokio::select! {
                    reachable = provider.probe() => reachable,
                    _ = shutdown.recv() => break,
                };
                let previous = state.sync();
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                state.sync.store(Arc::new(SyncSnapshot {
                    syncs: previous.syncs + 1,
                    backend_reachable: reachable,
                    last_sync: Some(now),
                }));
                metrics::record_backend_reachable(&name, reachable);
                tracing::debug!(name = %name, reachable, "Provider sync finished");
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }

    tracing::debug!(name = %name, "Sync loop stopped");
}
