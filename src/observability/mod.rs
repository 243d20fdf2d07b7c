//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Transports, pipeline and delivery produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log fields
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
