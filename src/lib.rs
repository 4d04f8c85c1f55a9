//! FaaS controller library.
//!
//! A supervisor owns named objects; each object kind is registered up front
//! and every generation of an object is validated before it replaces the
//! previous one. The FaaSController kind runs a front-end HTTP listener that
//! forwards function calls to a Knative installation.

pub mod admin;
pub mod config;
pub mod duration;
pub mod function;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod supervisor;
pub mod validation;

pub use config::schema::AppConfig;
pub use function::FaasController;
pub use lifecycle::{Runtime, Shutdown};
pub use supervisor::{Registry, Supervisor};
