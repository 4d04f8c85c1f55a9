//! FaaSController spec.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::FaasError;
use crate::http::spec::HttpServerSpec;
use crate::supervisor::ObjectSpec;
use crate::validation::{self, rules, Context, Validate};

/// Supported FaaS backends.
///
/// Unknown names are kept verbatim so validation can report them; they are
/// never replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    #[default]
    Knative,
    Unsupported(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Knative => "knative",
            Provider::Unsupported(name) => name,
        }
    }
}

impl From<String> for Provider {
    fn from(name: String) -> Self {
        match name.as_str() {
            "knative" => Provider::Knative,
            _ => Provider::Unsupported(name),
        }
    }
}

impl From<&str> for Provider {
    fn from(name: &str) -> Self {
        Provider::from(name.to_string())
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knative provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnativeSpec {
    /// Namespace the functions live in.
    pub namespace: String,

    /// Per-request timeout towards Knative, e.g. "2s".
    pub timeout: String,

    /// Knative networking layer (ingress) the worker forwards to.
    #[serde(rename = "networkLayerURL")]
    pub network_layer_url: String,

    /// Domain suffix of Knative service hosts.
    pub host_suffix: String,
}

impl Default for KnativeSpec {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            timeout: "2s".to_string(),
            network_layer_url: "http://127.0.0.1:8080".to_string(),
            host_suffix: "example.com".to_string(),
        }
    }
}

/// Spec of a FaaSController object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Admin {
    pub provider: Provider,

    /// How often the worker refreshes backend state, e.g. "10s".
    pub sync_interval: String,

    pub knative: KnativeSpec,

    pub http_server: HttpServerSpec,
}

impl Default for Admin {
    fn default() -> Self {
        Self {
            provider: Provider::Knative,
            sync_interval: "10s".to_string(),
            knative: KnativeSpec::default(),
            http_server: HttpServerSpec::default(),
        }
    }
}

impl ObjectSpec for Admin {
    type Error = FaasError;

    fn validate(&self) -> Result<(), FaasError> {
        match &self.provider {
            Provider::Knative => {}
            Provider::Unsupported(name) => return Err(FaasError::UnknownProvider(name.clone())),
        }

        rules::positive_duration(&self.sync_interval).map_err(FaasError::InvalidSyncInterval)?;

        let result = validation::validate(&self.knative);
        if !result.valid() {
            return Err(FaasError::InvalidKnative(result.error()));
        }

        let result = validation::validate(&self.http_server);
        if !result.valid() {
            return Err(FaasError::InvalidHttpServer(result.error()));
        }
        Ok(())
    }
}

/// Field checks the Knative provider needs at dispatch time.
impl Validate for KnativeSpec {
    fn validate(&self, ctx: &mut Context) {
        ctx.check("namespace", rules::dns_label(&self.namespace));
        ctx.check("timeout", rules::positive_duration(&self.timeout));
        ctx.check("networkLayerURL", rules::http_url(&self.network_layer_url));
        ctx.check("hostSuffix", rules::dns_name(&self.host_suffix));
    }
}
