//! Observability for the document store
//!
//! - Structured JSON logging with typed events
//! - Per-index counters
//!
//! Observability is read-only: nothing here feeds back into store decisions.
//!
//! ```ignore
//! use rebac_store::observability::{log_event, Event};
//!
//! log_event(Event::IdMinted, &[("dictionary", "encoding/namespace"), ("id", "1")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, StoreMetrics};

/// Log an event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Returns true if `event` would be written.
///
/// Lets hot paths skip building field strings.
#[inline]
pub fn event_enabled(event: Event) -> bool {
    Logger::enabled(event.severity())
}
