//! Observability for fxdesk
//!
//! Counters are kept in a process-local Prometheus registry and rendered on
//! demand (`fxdesk metrics`). Nothing here listens on a socket.

pub mod metrics;

pub use metrics::Metrics;
