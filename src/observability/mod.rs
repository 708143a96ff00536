//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Flows, clients, timers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → stderr (tracing-subscriber fmt layer)
//!     → whatever recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured key/value fields, never secrets
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
