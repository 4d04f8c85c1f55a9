//! HTTP server subsystem shared by objects.
//!
//! # Data Flow
//! ```text
//! HttpServerSpec (validated by the object's validator)
//!     → net::listener (bind)
//!     → server.rs (middleware: request ID, tracing, timeout)
//!     → object routes (e.g. FaaS dispatch)
//! ```

pub mod server;
pub mod spec;

pub use server::{HttpServer, X_REQUEST_ID};
pub use spec::HttpServerSpec;
