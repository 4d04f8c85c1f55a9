//! Startup orchestration.
//!
//! Order: metrics exporter, kind registry, objects, admin API. Object
//! failures are logged and do not abort startup; an unusable admin or metrics
//! listener does.

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::admin::{self, AdminState};
use crate::config::AppConfig;
use crate::function;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::supervisor::{Registry, Supervisor};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid {0} address: {1}")]
    Address(&'static str, String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind admin API on {0}: {1}")]
    AdminBind(SocketAddr, #[source] std::io::Error),
}

/// Register every object kind this binary ships.
pub fn register_objects(registry: &mut Registry) {
    function::register(registry);
}

/// A registry populated with all built-in kinds.
pub fn build_registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    register_objects(&mut registry);
    Arc::new(registry)
}

/// The running process: supervisor plus auxiliary servers.
pub struct Runtime {
    supervisor: Arc<Mutex<Supervisor>>,
    registry: Arc<Registry>,
    shutdown: Shutdown,
    admin: Option<(SocketAddr, JoinHandle<Result<(), std::io::Error>>)>,
    current: Mutex<AppConfig>,
}

impl Runtime {
    /// Bring up everything described by `config`.
    pub async fn start(config: &AppConfig, registry: Arc<Registry>) -> Result<Self, StartupError> {
        if config.metrics.enabled {
            let addr: SocketAddr = config
                .metrics
                .address
                .parse()
                .map_err(|_| StartupError::Address("metrics", config.metrics.address.clone()))?;
            metrics::init_metrics(addr)?;
        }

        let supervisor = Arc::new(Mutex::new(Supervisor::new(registry.clone())));
        let shutdown = Shutdown::new();

        let mut runtime = Self {
            supervisor,
            registry,
            shutdown,
            admin: None,
            current: Mutex::new(config.clone()),
        };
        runtime.reload(config).await;

        if config.admin.enabled {
            let addr: SocketAddr = config
                .admin
                .bind_address
                .parse()
                .map_err(|_| StartupError::Address("admin", config.admin.bind_address.clone()))?;
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| StartupError::AdminBind(addr, e))?;
            let local = listener.local_addr().unwrap_or(addr);

            let state = AdminState {
                supervisor: runtime.supervisor.clone(),
                registry: runtime.registry.clone(),
                api_key: config.admin.api_key.as_str().into(),
            };
            let handle = tokio::spawn(admin::serve(listener, state, runtime.shutdown.subscribe()));
            runtime.admin = Some((local, handle));
        }

        Ok(runtime)
    }

    /// Reconcile live objects with `config`. Failures are logged per object.
    pub async fn reload(&self, config: &AppConfig) {
        let errors = self.supervisor.lock().await.reconcile(&config.objects).await;
        if errors.is_empty() {
            tracing::info!(objects = config.objects.len(), "Objects reconciled");
        } else {
            tracing::warn!(
                objects = config.objects.len(),
                failed = errors.len(),
                "Objects reconciled with failures"
            );
        }
    }

    /// Apply `config` unless it equals the config in effect.
    ///
    /// File watcher and SIGHUP reloads both come through here, so there is a
    /// single current config to compare against. Returns `false` when
    /// nothing changed.
    pub async fn apply(&self, config: AppConfig) -> bool {
        let mut current = self.current.lock().await;
        if *current == config {
            tracing::debug!("Config unchanged, skipping reload");
            return false;
        }
        if config.logging != current.logging
            || config.metrics != current.metrics
            || config.admin != current.admin
        {
            tracing::warn!("Logging, metrics and admin settings apply on restart only");
        }
        self.reload(&config).await;
        *current = config;
        true
    }

    /// The config most recently applied.
    pub async fn current_config(&self) -> AppConfig {
        self.current.lock().await.clone()
    }

    pub fn supervisor(&self) -> &Arc<Mutex<Supervisor>> {
        &self.supervisor
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Address the admin API is bound to, when enabled.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin.as_ref().map(|(addr, _)| *addr)
    }

    /// Stop the admin API, then close every object.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Some((_, handle)) = self.admin {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
                Err(e) => tracing::error!(error = %e, "Admin API task failed"),
            }
        }
        self.supervisor.lock().await.close_all().await;
        tracing::info!("All objects closed");
    }
}
