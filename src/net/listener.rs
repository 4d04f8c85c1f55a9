//! TCP listener binding for object HTTP servers.
//!
//! # Responsibilities
//! - Resolve the configured address into a socket address
//! - Bind the listener, surfacing port conflicts as distinct errors

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::http::spec::HttpServerSpec;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// The configured address does not parse.
    Address(String),
    /// Failed to bind to address.
    Bind(SocketAddr, std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address(addr) => write!(f, "Invalid listen address: {}", addr),
            ListenerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Address(_) => None,
            ListenerError::Bind(_, e) => Some(e),
        }
    }
}

/// Bind a listener for the given HTTP server spec.
pub async fn bind(spec: &HttpServerSpec) -> Result<TcpListener, ListenerError> {
    let raw = spec.bind_address();
    let addr: SocketAddr = raw.parse().map_err(|_| ListenerError::Address(raw.clone()))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ListenerError::Bind(addr, e))?;

    tracing::info!(address = %addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_conflict_is_a_bind_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let spec = HttpServerSpec {
            port: taken.local_addr().unwrap().port(),
            address: "127.0.0.1".into(),
            ..HttpServerSpec::default()
        };

        let err = bind(&spec).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind(..)));
    }

    #[tokio::test]
    async fn test_bad_address() {
        let spec = HttpServerSpec {
            address: "nowhere".into(),
            ..HttpServerSpec::default()
        };
        assert!(matches!(bind(&spec).await, Err(ListenerError::Address(_))));
    }
}
