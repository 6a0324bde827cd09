//! Observable events
//!
//! Every log line names one of these. Events are explicit and typed, and each
//! carries the severity it is logged at.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup failed (FATAL)
    BootFailed,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Route schemas loaded
    SchemasLoaded,

    // Server
    /// Listener bound, ready for requests
    ServerListening,
    /// Route mounted behind the normalizer
    RouteMounted,

    // Normalization
    /// Request params normalized and forwarded
    ParamsNormalized,
    /// Request params failed validation
    ParamsRejected,
    /// Request body could not be read as a JSON object
    BodyRejected,
    /// One-shot check finished
    CheckComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "PARAMNORM_STARTUP_BEGIN",
            Event::BootFailed => "PARAMNORM_STARTUP_FAILED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",

            Event::ServerListening => "SERVER_LISTENING",
            Event::RouteMounted => "ROUTE_MOUNTED",

            Event::ParamsNormalized => "PARAMS_NORMALIZED",
            Event::ParamsRejected => "PARAMS_REJECTED",
            Event::BodyRejected => "BODY_REJECTED",
            Event::CheckComplete => "CHECK_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::BootFailed => Severity::Fatal,
            Event::ParamsRejected | Event::BodyRejected => Severity::Warn,
            Event::ParamsNormalized => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::BootStart,
            Event::BootFailed,
            Event::ShutdownComplete,
            Event::ConfigLoaded,
            Event::SchemasLoaded,
            Event::ServerListening,
            Event::RouteMounted,
            Event::ParamsNormalized,
            Event::ParamsRejected,
            Event::BodyRejected,
            Event::CheckComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_severities() {
        assert!(Event::BootFailed.is_fatal());
        assert!(!Event::BootStart.is_fatal());
        assert_eq!(Event::ParamsRejected.severity(), Severity::Warn);
        assert_eq!(Event::ParamsNormalized.severity(), Severity::Trace);
        assert_eq!(Event::ConfigLoaded.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::BootStart), "PARAMNORM_STARTUP_BEGIN");
        assert_eq!(format!("{}", Event::ParamsRejected), "PARAMS_REJECTED");
    }
}
