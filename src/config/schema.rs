//! Configuration schema definitions.
//!
//! The process config carries the ambient settings plus the list of objects
//! to supervise. Object specs stay untyped here; each kind decodes its own.

use serde::{Deserialize, Serialize};

/// Root configuration for the controller process.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Objects to run.
    pub objects: Vec<ObjectEntry>,
}

/// One supervised object.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObjectEntry {
    /// Unique object name.
    pub name: String,

    /// Kind, lowercase name or alias of a registered kind.
    pub kind: String,

    /// The remaining keys form the kind-specific spec.
    #[serde(flatten)]
    pub spec: serde_json::Map<String, serde_json::Value>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression). `RUST_LOG` takes precedence.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus scrape endpoint.
    pub enabled: bool,

    /// Scrape endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:2381".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_spec_is_flattened() {
        let config: AppConfig = toml::from_str(
            r#"
            [[objects]]
            name = "faas"
            kind = "FaaSController"
            provider = "knative"
            syncInterval = "10s"

            [objects.knative]
            namespace = "default"
            "#,
        )
        .unwrap();

        let entry = &config.objects[0];
        assert_eq!(entry.name, "faas");
        assert_eq!(entry.kind, "FaaSController");
        assert_eq!(entry.spec["provider"], "knative");
        assert_eq!(entry.spec["knative"]["namespace"], "default");
        assert!(!entry.spec.contains_key("name"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_json_log_format() {
        let config: AppConfig = toml::from_str("[logging]\nformat = \"json\"").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }
}
