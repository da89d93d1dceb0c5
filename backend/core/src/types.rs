use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Summary used when the model reply is empty and cannot be parsed.
pub const UNPARSABLE_SUMMARY: &str = "Model response could not be parsed.";

/// A single label returned by a vision backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Where a report's photo lives in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub key: String,
    pub public_url: String,
    pub presigned_url: String,
}

/// The expected shape of a model evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub match_summary: String,
    #[serde(default)]
    pub mismatches: Vec<String>,
    pub confidence: i64,
}

/// Outcome of comparing detected labels against a citizen description.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The model replied with valid JSON. Stored as-is, even when fields are missing.
    Parsed(Value),
    /// The reply was not JSON; carries the trimmed raw text.
    Degraded { raw: String },
}

impl Evaluation {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Confidence reported by the model; `Some(0)` when degraded.
    pub fn confidence(&self) -> Option<i64> {
        match self {
            Self::Parsed(value) => value.get("confidence").and_then(Value::as_i64),
            Self::Degraded { .. } => Some(0),
        }
    }

    /// Typed view of the evaluation, if the parsed JSON has the expected shape.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Parsed(value) => serde_json::from_value(value.clone()).ok(),
            Self::Degraded { raw } => Some(degraded_verdict(raw)),
        }
    }

    /// JSON form persisted on the report as `ai_verdict`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Degraded { raw } => {
                let v = degraded_verdict(&raw);
                json!({
                    "match_summary": v.match_summary,
                    "mismatches": v.mismatches,
                    "confidence": v.confidence,
                })
            }
        }
    }
}

fn degraded_verdict(raw: &str) -> Verdict {
    let summary = if raw.is_empty() {
        UNPARSABLE_SUMMARY.to_string()
    } else {
        raw.to_string()
    };
    Verdict {
        match_summary: summary,
        mismatches: Vec::new(),
        confidence: 0,
    }
}

/// One citizen-submitted accessibility observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub image: ImageRef,
    pub ai_verdict: Value,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Fresh opaque report identifier.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn confidence(&self) -> Option<i64> {
        self.ai_verdict.get("confidence").and_then(Value::as_i64)
    }
}
