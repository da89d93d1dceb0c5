//! Report Event Logger
//!
//! Lifecycle events for submitted reports, emitted through `tracing` so they
//! land in the NDJSON log alongside everything else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportEvent {
    Received {
        description: String,
        image_bytes: usize,
    },
    LabelsDetected {
        labels: Vec<String>,
    },
    Evaluated {
        confidence: Option<i64>,
        degraded: bool,
    },
    Stored {
        key: String,
    },
    Failed {
        stage: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ReportEventEntry {
    pub report_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ReportEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact free-text fields and emit the event under the `report_events` target.
    pub fn log_event(report_id: &str, mut event: ReportEvent) {
        match &mut event {
            ReportEvent::Received { description, .. } => {
                *description = redact_sensitive_data(description);
            }
            ReportEvent::Failed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        let failed = matches!(event, ReportEvent::Failed { .. });
        let entry = ReportEventEntry {
            report_id: report_id.into(),
            timestamp: Utc::now(),
            event,
        };
        let payload = serde_json::to_string(&entry).unwrap_or_default();

        if failed {
            warn!(target: "report_events", event = %payload, "Report event");
        } else {
            info!(target: "report_events", event = %payload, "Report event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let entry = ReportEventEntry {
            report_id: "r1".into(),
            timestamp: Utc::now(),
            event: ReportEvent::Evaluated {
                confidence: Some(92),
                degraded: false,
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "evaluated");
        assert_eq!(json["event"]["confidence"], 92);
    }
}
