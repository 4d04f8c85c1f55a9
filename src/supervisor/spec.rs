//! Object identity plus its immutable, type-erased spec.

use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use super::SupervisorError;

/// Everything an object generation is initialized with.
///
/// Cloning is cheap; the typed spec is shared read-only for the lifetime of
/// the generation.
#[derive(Clone)]
pub struct Spec {
    name: String,
    kind: String,
    generation: u64,
    raw: serde_json::Value,
    object: Arc<dyn Any + Send + Sync>,
}

impl Spec {
    /// Build a spec from an already-typed object spec.
    pub fn new<T>(name: impl Into<String>, kind: impl Into<String>, object: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        let raw = serde_json::to_value(&object).unwrap_or_default();
        Self {
            name: name.into(),
            kind: kind.into(),
            generation: 1,
            raw,
            object: Arc::new(object),
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// 1 for the first generation, incremented on every reconfiguration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The spec document as it was supplied, after defaults were applied.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Checked conversion to the kind's concrete spec type.
    pub fn object_spec<T>(&self) -> Result<Arc<T>, SupervisorError>
    where
        T: Send + Sync + 'static,
    {
        self.object
            .clone()
            .downcast::<T>()
            .map_err(|_| SupervisorError::TypeMismatch {
                kind: self.kind.clone(),
                expected: type_name::<T>(),
            })
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("generation", &self.generation)
            .field("raw", &self.raw)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::testing::ProbeSpec;

    #[test]
    fn test_checked_conversion() {
        let spec = Spec::new("p1", "Probe", ProbeSpec { label: "a".into(), fail_init: false });
        assert_eq!(spec.object_spec::<ProbeSpec>().unwrap().label, "a");
        assert_eq!(spec.raw()["label"], "a");

        let err = spec.object_spec::<String>().unwrap_err();
        assert!(matches!(err, SupervisorError::TypeMismatch { ref kind, .. } if kind == "Probe"));
        assert!(err.to_string().contains("String"));
    }

    #[test]
    fn test_clones_share_the_same_spec() {
        let spec = Spec::new("p1", "Probe", ProbeSpec::default()).with_generation(3);
        let copy = spec.clone();
        assert_eq!(copy.generation(), 3);
        assert!(Arc::ptr_eq(
            &spec.object_spec::<ProbeSpec>().unwrap(),
            &copy.object_spec::<ProbeSpec>().unwrap()
        ));
    }
}
