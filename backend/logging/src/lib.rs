//! Structured logging for the AccessPlus reporter.
//!
//! Handles console + rolling NDJSON output, secret redaction, and report lifecycle events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, ReportEvent, ReportEventEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
