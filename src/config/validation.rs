//! Configuration validation.
//!
//! Semantic checks on the process config (serde handles syntax). Object specs
//! are only checked for identity here; their contents are validated by their
//! kind when applied.

use std::collections::HashSet;

use crate::config::schema::AppConfig;
use crate::validation::{rules, validate, Context, Validate, Violation};

impl Validate for AppConfig {
    fn validate(&self, ctx: &mut Context) {
        ctx.check("logging.level", rules::non_empty(&self.logging.level));

        if self.metrics.enabled {
            ctx.check("metrics.address", rules::socket_addr(&self.metrics.address));
        }

        if self.admin.enabled {
            ctx.check("admin.bind_address", rules::socket_addr(&self.admin.bind_address));
            ctx.check("admin.api_key", rules::non_empty(&self.admin.api_key));
        }

        let mut seen = HashSet::new();
        for (i, object) in self.objects.iter().enumerate() {
            let field = format!("objects[{}]", i);
            ctx.check(&format!("{}.name", field), rules::non_empty(&object.name));
            ctx.check(&format!("{}.kind", field), rules::non_empty(&object.kind));
            if !seen.insert(object.name.as_str()) {
                ctx.check(
                    &format!("{}.name", field),
                    Err(format!("duplicate object name {:?}", object.name)),
                );
            }
        }
    }
}

/// Validate the whole config, returning every violation.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<Violation>> {
    let result = validate(config);
    if result.valid() {
        Ok(())
    } else {
        Err(result.into_violations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ObjectEntry;

    fn object(name: &str) -> ObjectEntry {
        ObjectEntry {
            name: name.into(),
            kind: "faas".into(),
            spec: Default::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_names_and_bad_admin() {
        let mut config = AppConfig::default();
        config.objects = vec![object("a"), object("a")];
        config.admin.enabled = true;
        config.admin.bind_address = "localhost".into();

        let violations = validate_config(&config).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["admin.bind_address", "objects[1].name"]);
    }
}
