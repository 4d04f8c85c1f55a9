//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor, controllers, workers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every lifecycle transition logs object name, kind and generation
//! - Request ID flows from the front-end listener into dispatch logs

pub mod logging;
pub mod metrics;
