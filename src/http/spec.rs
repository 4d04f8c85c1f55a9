//! HTTP server spec embedded by objects that expose a front-end listener.

use serde::{Deserialize, Serialize};

use crate::validation::{rules, Context, Validate};

/// Front-end listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpServerSpec {
    /// Listening port.
    pub port: u16,

    /// Bind IP address.
    pub address: String,

    /// Total time allowed per request, e.g. "30s".
    pub request_timeout: String,

    /// Maximum accepted request body in bytes.
    pub client_max_body_size: usize,
}

impl Default for HttpServerSpec {
    fn default() -> Self {
        Self {
            port: 10083,
            address: "0.0.0.0".to_string(),
            request_timeout: "30s".to_string(),
            client_max_body_size: 4 * 1024 * 1024,
        }
    }
}

impl HttpServerSpec {
    /// `address:port` as a bindable string.
    pub fn bind_address(&self) -> String {
        match self.address.parse::<std::net::IpAddr>() {
            Ok(std::net::IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.address, self.port),
        }
    }
}

impl Validate for HttpServerSpec {
    fn validate(&self, ctx: &mut Context) {
        ctx.check("port", rules::port(self.port));
        ctx.check("address", rules::ip_addr(&self.address));
        ctx.check("requestTimeout", rules::positive_duration(&self.request_timeout));
        ctx.check("clientMaxBodySize", rules::min(self.client_max_body_size, 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_default_is_valid() {
        assert!(validate(&HttpServerSpec::default()).valid());
    }

    #[test]
    fn test_bind_address() {
        let mut spec = HttpServerSpec::default();
        assert_eq!(spec.bind_address(), "0.0.0.0:10083");
        spec.address = "::1".into();
        assert_eq!(spec.bind_address(), "[::1]:10083");
    }

    #[test]
    fn test_reports_every_violation() {
        let spec = HttpServerSpec {
            port: 0,
            address: "not-an-ip".into(),
            request_timeout: "forever".into(),
            client_max_body_size: 0,
        };
        let result = validate(&spec);
        let fields: Vec<_> = result.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            ["port", "address", "requestTimeout", "clientMaxBodySize"]
        );
    }

    #[test]
    fn test_partial_document_takes_defaults() {
        let spec: HttpServerSpec = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(spec.port, 8080);
        assert_eq!(spec.address, "0.0.0.0");
        assert_eq!(spec.request_timeout, "30s");
    }
}
