//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (domain id, hostname, op)
//! - Request ID flows through the HTTP layer
//! - Metric updates are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
