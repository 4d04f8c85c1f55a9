//! FaaSController: supervises a FaaS provider integration.
//!
//! # Lifecycle
//! ```text
//! Created ──init──▶ Running ──close──▶ Closed
//!    │                                   ▲
//!    └──────────────close────────────────┘
//!
//! inherit(spec, previous):
//!     previous.close()  (listener released)
//!     → init(spec)      (validate, then start the worker)
//! ```
//!
//! # Design Decisions
//! - The spec is validated inside `init` even though the supervisor already
//!   did; no worker is ever built from an unchecked spec
//! - `inherit` takes the previous generation by value, closes it, and drops
//!   it before anything of the new generation is acquired
//! - A failed `inherit` leaves no worker running; there is no rollback
//! - `Closed` is terminal

pub mod dispatch;
pub mod provider;
pub mod spec;
pub mod worker;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::supervisor::{
    BoxError, Object, ObjectCategory, ObjectKind, ObjectSpec, Registry, Spec, Status,
    SupervisorError,
};
use spec::Admin;
use worker::{Worker, WorkerError};

/// Category of FaaSController.
pub const CATEGORY: ObjectCategory = ObjectCategory::BusinessController;

/// Kind of FaaSController.
pub const KIND: &str = "FaaSController";

const ALIASES: &[&str] = &["faas"];

/// Errors raised by the FaaS controller.
#[derive(Debug, Error)]
pub enum FaasError {
    #[error("unknown FaaS provider: {0}")]
    UnknownProvider(String),

    #[error("invalid httpServer: {0}")]
    InvalidHttpServer(String),

    #[error("invalid knative: {0}")]
    InvalidKnative(String),

    #[error("invalid syncInterval: {0}")]
    InvalidSyncInterval(String),

    #[error(transparent)]
    Spec(#[from] SupervisorError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("controller is already running")]
    AlreadyRunning,

    #[error("controller is closed")]
    Closed,
}

enum Phase {
    Created,
    Running(Worker),
    Closed,
}

/// Function controller.
pub struct FaasController {
    super_spec: Option<Spec>,
    spec: Option<Arc<Admin>>,
    phase: Phase,
}

impl Default for FaasController {
    fn default() -> Self {
        Self {
            super_spec: None,
            spec: None,
            phase: Phase::Created,
        }
    }
}

/// Make FaaSController available in `registry`.
pub fn register(registry: &mut Registry) {
    registry.register::<FaasController>();
}

impl FaasController {
    /// Identity of this generation, once initialized.
    pub fn super_spec(&self) -> Option<&Spec> {
        self.super_spec.as_ref()
    }

    /// The accepted spec of this generation, once initialized.
    pub fn spec(&self) -> Option<&Arc<Admin>> {
        self.spec.as_ref()
    }

    pub fn worker(&self) -> Option<&Worker> {
        match &self.phase {
            Phase::Running(worker) => Some(worker),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    async fn start(&mut self, super_spec: Spec) -> Result<(), FaasError> {
        match self.phase {
            Phase::Created => {}
            Phase::Running(_) => return Err(FaasError::AlreadyRunning),
            Phase::Closed => return Err(FaasError::Closed),
        }

        let spec = super_spec.object_spec::<Admin>()?;
        spec.validate()?;

        self.super_spec = Some(super_spec.clone());
        self.spec = Some(spec.clone());
        self.reload(&super_spec, spec).await
    }

    async fn reload(&mut self, super_spec: &Spec, spec: Arc<Admin>) -> Result<(), FaasError> {
        let worker = Worker::start(super_spec, spec).await?;
        self.phase = Phase::Running(worker);
        Ok(())
    }
}

#[async_trait]
impl Object for FaasController {
    fn category(&self) -> ObjectCategory {
        CATEGORY
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn init(&mut self, spec: Spec) -> Result<(), BoxError> {
        let name = spec.name().to_string();
        let generation = spec.generation();
        self.start(spec).await.map_err(|e| {
            tracing::error!(name = %name, generation, error = %e, "FaaSController init failed");
            Box::new(e) as BoxError
        })
    }

    async fn inherit(&mut self, spec: Spec, mut previous: Box<dyn Object>) -> Result<(), BoxError> {
        tracing::info!(
            name = %spec.name(),
            generation = spec.generation(),
            "Closing previous FaaSController generation"
        );
        previous.close().await;
        drop(previous);
        self.init(spec).await
    }

    fn status(&self) -> Status {
        match &self.phase {
            Phase::Running(worker) => {
                Status::new(serde_json::to_value(worker.status()).unwrap_or_default())
            }
            Phase::Created => Status::default(),
            Phase::Closed => Status::new(serde_json::json!({ "closed": true })),
        }
    }

    async fn close(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Running(worker) => worker.close().await,
            Phase::Created => {
                tracing::debug!("FaaSController closed before a worker was started");
            }
            Phase::Closed => {
                tracing::debug!("FaaSController already closed");
            }
        }
    }
}

impl ObjectKind for FaasController {
    type Spec = Admin;

    const CATEGORY: ObjectCategory = CATEGORY;
    const KIND: &'static str = KIND;
    const ALIASES: &'static [&'static str] = ALIASES;
}
