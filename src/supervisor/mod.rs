//! Object supervision subsystem.
//!
//! # Data Flow
//! ```text
//! [[objects]] entry (name, kind, raw spec)
//!     → registry.rs (kind lookup, typed spec, defaults)
//!     → spec.rs (Spec: identity + immutable typed object spec)
//!     → objects.rs (Supervisor: validate, then Init or Inherit)
//!     → Object (one live generation per name)
//! ```
//!
//! # Design Decisions
//! - Kinds are registered explicitly at bootstrap; no load-time globals
//! - Specs are stored type-erased and downcast with a checked conversion
//! - `inherit` consumes the previous generation, so it can be closed exactly
//!   once and never touched again
//! - Lifecycle calls take `&mut self` and are awaited serially

pub mod objects;
pub mod registry;
pub mod spec;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use objects::Supervisor;
pub use registry::{ApiResource, Registry};
pub use spec::Spec;

/// Error type crossing the object boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification used for registration and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectCategory {
    SystemController,
    BusinessController,
    Pipeline,
    TrafficGate,
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectCategory::SystemController => "SystemController",
            ObjectCategory::BusinessController => "BusinessController",
            ObjectCategory::Pipeline => "Pipeline",
            ObjectCategory::TrafficGate => "TrafficGate",
        };
        f.write_str(s)
    }
}

/// Runtime status snapshot of an object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Unix timestamp (seconds) when the snapshot was taken.
    pub timestamp: u64,

    /// Kind-specific payload; `null` when the object has nothing to report.
    pub object_status: serde_json::Value,
}

impl Status {
    pub fn new(object_status: serde_json::Value) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            timestamp,
            object_status,
        }
    }
}

/// A supervised object generation.
#[async_trait]
pub trait Object: Send + Sync {
    fn category(&self) -> ObjectCategory;

    fn kind(&self) -> &'static str;

    /// Bring up the first generation.
    async fn init(&mut self, spec: Spec) -> Result<(), BoxError>;

    /// Close `previous` completely, then initialize this generation.
    async fn inherit(&mut self, spec: Spec, previous: Box<dyn Object>) -> Result<(), BoxError>;

    fn status(&self) -> Status;

    /// Release everything the generation holds. Safe to call more than once.
    async fn close(&mut self);
}

/// Typed object spec carried by a [`Spec`].
pub trait ObjectSpec:
    serde::de::DeserializeOwned + Serialize + Default + Send + Sync + 'static
{
    type Error: std::error::Error + Send + Sync + 'static;

    fn validate(&self) -> Result<(), Self::Error>;
}

/// Static description of an object kind, available before any instance exists.
pub trait ObjectKind: Object + Default + 'static {
    type Spec: ObjectSpec;

    const CATEGORY: ObjectCategory;
    const KIND: &'static str;
    const ALIASES: &'static [&'static str];

    fn default_spec() -> Self::Spec {
        Self::Spec::default()
    }
}

/// Errors raised by the registry and supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("spec of {kind} object is not a {expected}")]
    TypeMismatch { kind: String, expected: &'static str },

    #[error("failed to decode spec of {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid spec for {name}: {source}")]
    InvalidSpec {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("object {name} failed to start: {source}")]
    Start {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("object {0} not found")]
    NotFound(String),
}

#[cfg(test)]
pub(crate) mod testing {
    //! An instrumented object kind that records lifecycle events.

    use super::*;
    use serde::Deserialize;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(default)]
    pub struct ProbeSpec {
        pub label: String,
        pub fail_init: bool,
    }

    #[derive(Debug, Error)]
    #[error("label must not be empty")]
    pub struct EmptyLabel;

    impl ObjectSpec for ProbeSpec {
        type Error = EmptyLabel;

        fn validate(&self) -> Result<(), EmptyLabel> {
            if self.label.is_empty() {
                return Err(EmptyLabel);
            }
            Ok(())
        }
    }

    pub type EventLog = Arc<Mutex<Vec<String>>>;

    pub fn event_log() -> EventLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn log_for(spec: &Spec) -> EventLog {
        SHARED
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == spec.name())
            .map(|(_, log)| log.clone())
            .unwrap_or_default()
    }

    static SHARED: Mutex<Vec<(String, EventLog)>> = Mutex::new(Vec::new());

    /// Route events of objects named `name` into `log`.
    pub fn attach(name: &str, log: &EventLog) {
        SHARED.lock().unwrap().push((name.to_string(), log.clone()));
    }

    #[derive(Default)]
    pub struct Probe {
        label: Option<String>,
        log: EventLog,
    }

    #[async_trait]
    impl Object for Probe {
        fn category(&self) -> ObjectCategory {
            ObjectCategory::SystemController
        }

        fn kind(&self) -> &'static str {
            Self::KIND
        }

        async fn init(&mut self, spec: Spec) -> Result<(), BoxError> {
            self.log = log_for(&spec);
            let probe = spec.object_spec::<ProbeSpec>()?;
            if probe.fail_init {
                self.log.lock().unwrap().push(format!("fail {}", probe.label));
                return Err("init failed".into());
            }
            self.log.lock().unwrap().push(format!("init {}", probe.label));
            self.label = Some(probe.label.clone());
            Ok(())
        }

        async fn inherit(&mut self, spec: Spec, mut previous: Box<dyn Object>) -> Result<(), BoxError> {
            previous.close().await;
            self.init(spec).await
        }

        fn status(&self) -> Status {
            Status::new(serde_json::json!({ "label": self.label }))
        }

        async fn close(&mut self) {
            if let Some(label) = self.label.take() {
                self.log.lock().unwrap().push(format!("close {}", label));
            }
        }
    }

    impl ObjectKind for Probe {
        type Spec = ProbeSpec;

        const CATEGORY: ObjectCategory = ObjectCategory::SystemController;
        const KIND: &'static str = "Probe";
        const ALIASES: &'static [&'static str] = &["probe", "pr"];
    }
}
