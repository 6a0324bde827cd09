//! Observability for paramnorm
//!
//! Structured JSON logging plus the typed events it reports. Only the HTTP
//! and CLI layers log; the normalizer itself stays side-effect free.
//!
//! # Usage
//!
//! ```ignore
//! use paramnorm::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ParamsRejected, &[("path", "/products")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
