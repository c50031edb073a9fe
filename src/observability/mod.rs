//! Observability subsystem for tagsift
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Monotonic counters
//!
//! Observability never changes query results and never fails a query.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
