//! Registry of object kinds.
//!
//! Each kind is registered once during bootstrap together with its API
//! resource (category, kind, lowercase name, aliases). The registry is passed
//! explicitly to whoever needs it; there is no process-wide instance.

use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Object, ObjectCategory, ObjectKind, ObjectSpec, Spec, SupervisorError};

/// How a kind is addressed by operators and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResource {
    pub category: ObjectCategory,
    pub kind: String,
    pub name: String,
    pub aliases: Vec<String>,
}

/// Type-erased operations of a registered kind.
trait Descriptor: Send + Sync {
    fn resource(&self) -> &ApiResource;
    fn default_spec(&self) -> serde_json::Value;
    fn build_spec(&self, name: &str, raw: serde_json::Value) -> Result<Spec, SupervisorError>;
    fn validate(&self, spec: &Spec) -> Result<(), SupervisorError>;
    fn create(&self) -> Box<dyn Object>;
}

struct Registration<K> {
    resource: ApiResource,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ObjectKind> Descriptor for Registration<K> {
    fn resource(&self) -> &ApiResource {
        &self.resource
    }

    fn default_spec(&self) -> serde_json::Value {
        serde_json::to_value(K::default_spec()).unwrap_or_default()
    }

    fn build_spec(&self, name: &str, raw: serde_json::Value) -> Result<Spec, SupervisorError> {
        let object: K::Spec = serde_json::from_value(raw).map_err(|source| SupervisorError::Decode {
            name: name.to_string(),
            source,
        })?;
        Ok(Spec::new(name, K::KIND, object))
    }

    fn validate(&self, spec: &Spec) -> Result<(), SupervisorError> {
        spec.object_spec::<K::Spec>()?
            .validate()
            .map_err(|e| SupervisorError::InvalidSpec {
                name: spec.name().to_string(),
                source: Box::new(e),
            })
    }

    fn create(&self) -> Box<dyn Object> {
        Box::new(K::default())
    }
}

/// Kind handle returned by lookups.
#[derive(Clone)]
pub struct KindEntry {
    inner: Arc<dyn Descriptor>,
}

impl KindEntry {
    pub fn resource(&self) -> &ApiResource {
        self.inner.resource()
    }

    pub fn kind(&self) -> &str {
        &self.inner.resource().kind
    }

    /// The kind's default spec, serialized.
    pub fn default_spec(&self) -> serde_json::Value {
        self.inner.default_spec()
    }

    /// Decode `raw` over the kind's defaults into a typed [`Spec`].
    pub fn build_spec(&self, name: &str, raw: serde_json::Value) -> Result<Spec, SupervisorError> {
        self.inner.build_spec(name, raw)
    }

    pub fn validate(&self, spec: &Spec) -> Result<(), SupervisorError> {
        self.inner.validate(spec)
    }

    /// A fresh, uninitialized object of this kind.
    pub fn create(&self) -> Box<dyn Object> {
        self.inner.create()
    }
}

/// All kinds known to this process.
#[derive(Default)]
pub struct Registry {
    kinds: HashMap<String, KindEntry>,
    lookup: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register kind `K`. Registering an already-known kind is a no-op.
    ///
    /// Returns `true` when the kind was newly added.
    pub fn register<K: ObjectKind>(&mut self) -> bool {
        if self.kinds.contains_key(K::KIND) {
            tracing::debug!(kind = K::KIND, "Kind already registered");
            return false;
        }

        let resource = ApiResource {
            category: K::CATEGORY,
            kind: K::KIND.to_string(),
            name: K::KIND.to_lowercase(),
            aliases: K::ALIASES.iter().map(|a| a.to_string()).collect(),
        };

        for key in std::iter::once(&resource.name).chain(resource.aliases.iter()) {
            if let Some(owner) = self.lookup.get(key) {
                tracing::warn!(name = %key, owner = %owner, kind = K::KIND, "Lookup name already taken");
                continue;
            }
            self.lookup.insert(key.clone(), resource.kind.clone());
        }

        tracing::info!(
            kind = %resource.kind,
            category = %resource.category,
            aliases = ?resource.aliases,
            "Registered object kind"
        );

        let entry = KindEntry {
            inner: Arc::new(Registration::<K> {
                resource,
                _kind: PhantomData,
            }),
        };
        self.kinds.insert(K::KIND.to_string(), entry);
        true
    }

    /// Find a kind by kind string, lowercase name or alias.
    pub fn get(&self, key: &str) -> Option<&KindEntry> {
        self.kinds
            .get(key)
            .or_else(|| self.lookup.get(key).and_then(|kind| self.kinds.get(kind)))
    }

    pub fn lookup(&self, key: &str) -> Result<&KindEntry, SupervisorError> {
        self.get(key)
            .ok_or_else(|| SupervisorError::UnknownKind(key.to_string()))
    }

    /// Registered API resources, sorted by kind.
    pub fn resources(&self) -> Vec<ApiResource> {
        let mut resources: Vec<_> = self.kinds.values().map(|e| e.resource().clone()).collect();
        resources.sort_by(|a, b| a.kind.cmp(&b.kind));
        resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::testing::{Probe, ProbeSpec};

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = Registry::new();
        assert!(registry.register::<Probe>());
        assert!(!registry.register::<Probe>());
        assert_eq!(registry.resources().len(), 1);
    }

    #[test]
    fn test_lookup_by_kind_name_and_alias() {
        let mut registry = Registry::new();
        registry.register::<Probe>();

        for key in ["Probe", "probe", "pr"] {
            assert_eq!(registry.lookup(key).unwrap().kind(), "Probe");
        }
        assert!(matches!(
            registry.lookup("Nope"),
            Err(SupervisorError::UnknownKind(k)) if k == "Nope"
        ));

        let resource = registry.lookup("pr").unwrap().resource();
        assert_eq!(resource.name, "probe");
        assert_eq!(resource.category, ObjectCategory::SystemController);
    }

    #[test]
    fn test_build_and_validate_spec() {
        let mut registry = Registry::new();
        registry.register::<Probe>();
        let entry = registry.lookup("probe").unwrap();

        assert_eq!(entry.default_spec(), serde_json::json!({ "label": "", "fail_init": false }));

        let spec = entry.build_spec("p1", serde_json::json!({ "label": "x" })).unwrap();
        assert_eq!(spec.kind(), "Probe");
        assert_eq!(spec.object_spec::<ProbeSpec>().unwrap().label, "x");
        assert!(entry.validate(&spec).is_ok());

        let empty = entry.build_spec("p2", serde_json::json!({})).unwrap();
        let err = entry.validate(&empty).unwrap_err();
        assert_eq!(err.to_string(), "invalid spec for p2: label must not be empty");

        let bad = entry.build_spec("p3", serde_json::json!({ "label": 7 }));
        assert!(matches!(bad, Err(SupervisorError::Decode { .. })));
    }
}
