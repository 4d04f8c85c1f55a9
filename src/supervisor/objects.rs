//! Live object generations.
//!
//! The supervisor owns at most one live generation per object name. Every
//! transition validates the new spec first, so an invalid spec never replaces
//! a running generation. Once validation passes the transition is one-way:
//! the previous generation is closed before the new one is initialized.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{Object, Registry, Spec, Status, SupervisorError};
use crate::config::ObjectEntry;
use crate::observability::metrics;

struct Live {
    spec: Spec,
    object: Box<dyn Object>,
}

/// Owner of every live object in the process.
pub struct Supervisor {
    registry: Arc<Registry>,
    objects: BTreeMap<String, Live>,
    generations: BTreeMap<String, u64>,
}

impl Supervisor {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            objects: BTreeMap::new(),
            generations: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Create or reconfigure the object described by `entry`.
    pub async fn apply(&mut self, entry: &ObjectEntry) -> Result<(), SupervisorError> {
        let kind = self.registry.lookup(&entry.kind)?.clone();
        let raw = serde_json::Value::Object(entry.spec.clone());
        let generation = self.generations.get(&entry.name).copied().unwrap_or(0) + 1;
        let spec = kind.build_spec(&entry.name, raw)?.with_generation(generation);

        kind.validate(&spec)?;

        let mut object = kind.create();
        let result = match self.objects.remove(&entry.name) {
            Some(previous) if previous.spec.kind() == spec.kind() => {
                tracing::info!(
                    name = %entry.name,
                    kind = %spec.kind(),
                    generation,
                    "Reconfiguring object"
                );
                object.inherit(spec.clone(), previous.object).await
            }
            Some(mut previous) => {
                tracing::info!(
                    name = %entry.name,
                    from = %previous.spec.kind(),
                    to = %spec.kind(),
                    "Object kind changed, replacing"
                );
                previous.object.close().await;
                drop(previous);
                object.init(spec.clone()).await
            }
            None => {
                tracing::info!(name = %entry.name, kind = %spec.kind(), "Creating object");
                object.init(spec.clone()).await
            }
        };

        self.generations.insert(entry.name.clone(), generation);

        if let Err(source) = result {
            // Whatever was running before has already been closed.
            object.close().await;
            tracing::error!(name = %entry.name, generation, error = %source, "Object failed to start");
            return Err(SupervisorError::Start {
                name: entry.name.clone(),
                source,
            });
        }

        metrics::record_generation(&entry.name, generation);
        self.objects.insert(entry.name.clone(), Live { spec, object });
        Ok(())
    }

    /// Close and forget the object called `name`.
    pub async fn remove(&mut self, name: &str) -> Result<(), SupervisorError> {
        let mut live = self
            .objects
            .remove(name)
            .ok_or_else(|| SupervisorError::NotFound(name.to_string()))?;
        tracing::info!(name, kind = %live.spec.kind(), "Deleting object");
        live.object.close().await;
        Ok(())
    }

    /// Converge on `entries`: create new objects, reconfigure changed ones,
    /// delete those no longer listed. Unchanged objects are left alone.
    ///
    /// Every entry is attempted; the failures are returned.
    pub async fn reconcile(&mut self, entries: &[ObjectEntry]) -> Vec<SupervisorError> {
        let mut errors = Vec::new();

        let wanted: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();
        for name in stale {
            if let Err(e) = self.remove(&name).await {
                errors.push(e);
            }
        }

        for entry in entries {
            if self.is_unchanged(entry) {
                tracing::debug!(name = %entry.name, "Object unchanged");
                continue;
            }
            if let Err(e) = self.apply(entry).await {
                tracing::error!(name = %entry.name, error = %e, "Failed to apply object");
                errors.push(e);
            }
        }

        errors
    }

    fn is_unchanged(&self, entry: &ObjectEntry) -> bool {
        let Some(live) = self.objects.get(&entry.name) else {
            return false;
        };
        let Ok(kind) = self.registry.lookup(&entry.kind) else {
            return false;
        };
        if kind.kind() != live.spec.kind() {
            return false;
        }
        kind.build_spec(&entry.name, serde_json::Value::Object(entry.spec.clone()))
            .map(|spec| spec.raw() == live.spec.raw())
            .unwrap_or(false)
    }

    pub fn status(&self, name: &str) -> Result<Status, SupervisorError> {
        self.objects
            .get(name)
            .map(|live| live.object.status())
            .ok_or_else(|| SupervisorError::NotFound(name.to_string()))
    }

    /// Status of every live object, keyed by name.
    pub fn statuses(&self) -> BTreeMap<String, Status> {
        self.objects
            .iter()
            .map(|(name, live)| (name.clone(), live.object.status()))
            .collect()
    }

    /// The spec of the live generation of `name`.
    pub fn spec(&self, name: &str) -> Option<&Spec> {
        self.objects.get(name).map(|live| &live.spec)
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    /// Close every object, in name order.
    pub async fn close_all(&mut self) {
        let objects = std::mem::take(&mut self.objects);
        for (name, mut live) in objects {
            tracing::info!(name = %name, "Closing object");
            live.object.close().await;
        }
    }
}
