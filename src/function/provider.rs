//! Knative provider.
//!
//! # Responsibilities
//! - Map a function name to the Knative service host
//! - Build the upstream request towards the networking layer
//! - Probe the networking layer for the worker's sync loop

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use thiserror::Error;
use tokio::time;

use super::spec::KnativeSpec;
use crate::duration::parse_duration;
use crate::validation::{self, rules};

/// Errors raised by the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid knative spec: {0}")]
    InvalidSpec(String),

    #[error("invalid function name: {0}")]
    InvalidFunction(String),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

/// Request dispatcher for one Knative installation.
#[derive(Clone)]
pub struct Knative {
    namespace: String,
    host_suffix: String,
    base: String,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl Knative {
    pub fn new(spec: &KnativeSpec) -> Result<Self, ProviderError> {
        let result = validation::validate(spec);
        if !result.valid() {
            return Err(ProviderError::InvalidSpec(result.error()));
        }
        let timeout =
            parse_duration(&spec.timeout).map_err(|e| ProviderError::InvalidSpec(e.to_string()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            namespace: spec.namespace.clone(),
            host_suffix: spec.host_suffix.clone(),
            base: spec.network_layer_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Knative service host of `function`.
    pub fn host(&self, function: &str) -> String {
        format!("{}.{}.{}", function, self.namespace, self.host_suffix)
    }

    /// Build the request forwarding `path` of `function` to Knative.
    pub fn build_request(
        &self,
        function: &str,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Request<Body>, ProviderError> {
        rules::dns_label(function).map_err(ProviderError::InvalidFunction)?;

        let mut target = format!("{}/{}", self.base, path.trim_start_matches('/'));
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        let uri: Uri = target
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ProviderError::Request(e.into()))?;

        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(out) = builder.headers_mut() {
            for (name, value) in headers {
                if name != header::HOST && name != header::CONTENT_LENGTH {
                    out.append(name.clone(), value.clone());
                }
            }
            let host = HeaderValue::from_str(&self.host(function))
                .map_err(|e| ProviderError::Request(e.into()))?;
            out.insert(header::HOST, host);
        }

        Ok(builder.body(Body::from(body))?)
    }

    /// Send `request`, bounded by the provider timeout.
    pub async fn send(&self, request: Request<Body>) -> Result<axum::response::Response, ProviderError> {
        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(axum::response::Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(ProviderError::Upstream(e)),
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }

    /// Whether the networking layer answers at all.
    ///
    /// Any HTTP response counts; Knative returns 404 for unknown hosts.
    pub async fn probe(&self) -> bool {
        let request = match Request::builder()
            .method(Method::GET)
            .uri(format!("{}/", self.base))
            .header(header::USER_AGENT, "faas-controller-sync")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build probe request");
                return false;
            }
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!(url = %self.base, error = %e, "Knative probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(url = %self.base, "Knative probe failed: timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knative() -> Knative {
        Knative::new(&KnativeSpec {
            namespace: "faas".into(),
            network_layer_url: "http://127.0.0.1:31080/".into(),
            ..KnativeSpec::default()
        })
        .unwrap()
    }

    #[test]
    fn test_builds_host_routed_request() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let req = knative()
            .build_request("hello", Method::POST, "v1/greet", Some("a=1"), &headers, Bytes::from("hi"))
            .unwrap();

        assert_eq!(*req.method(), Method::POST);
        assert_eq!(req.uri(), "http://127.0.0.1:31080/v1/greet?a=1");
        assert_eq!(req.headers()[header::HOST], "hello.faas.example.com");
        assert_eq!(req.headers()["x-request-id"], "abc");
    }

    #[test]
    fn test_rejects_bad_function_name() {
        let err = knative()
            .build_request("Not_A_Label", Method::GET, "", None, &HeaderMap::new(), Bytes::new())
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidFunction(_)));
    }

    #[test]
    fn test_rejects_invalid_spec() {
        let spec = KnativeSpec {
            timeout: "0s".into(),
            ..KnativeSpec::default()
        };
        assert!(matches!(Knative::new(&spec), Err(ProviderError::InvalidSpec(_))));
    }
}
