//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Register kinds → Reconcile objects → Start admin API
//!
//! Reload (file watcher or SIGHUP):
//!     Load config → Validate → Reconcile (Inherit changed objects)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop admin API → Close every object → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger config reload
//! ```
//!
//! # Design Decisions
//! - Kinds are registered before any object is created
//! - Object teardown is never bounded by a timeout; a stuck worker blocks
//!   the transition instead of leaking its listener

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Runtime;
