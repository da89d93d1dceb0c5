//! Config validation: range and sanity checks with user-friendly messages.

use crate::env::Config;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All error messages joined on one line.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &Config) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_detection(config, &mut report);
    validate_model(config, &mut report);
    validate_storage(config, &mut report);
    report
}

fn validate_detection(config: &Config, report: &mut ValidationReport) {
    let min = config.min_confidence;
    if !(0.0..=100.0).contains(&min) {
        report.error("min_confidence", format!("{min} is outside 0-100"));
    } else if min < 50.0 {
        report.warn(
            "min_confidence",
            format!("{min} admits low-confidence labels into the comparison"),
        );
    }
    if config.max_labels == 0 {
        report.error("max_labels", "Must request at least one label");
    } else if config.max_labels > 100 {
        report.warn("max_labels", "Large label lists make the comparison prompt noisy");
    }
}

fn validate_model(config: &Config, report: &mut ValidationReport) {
    if config.openai_model.trim().is_empty() {
        report.error("openai_model", "Model id cannot be empty");
    }
    if !config.openai_base_url.starts_with("http://")
        && !config.openai_base_url.starts_with("https://")
    {
        report.error("openai_base_url", "Base URL must be http(s)");
    }
}

fn validate_storage(config: &Config, report: &mut ValidationReport) {
    if config.aws_region.trim().is_empty() {
        report.error("aws_region", "Region cannot be empty");
    }
    if config.reports_index_key.ends_with('/') {
        report.error("reports_index_key", "Manifest key must name an object, not a prefix");
    }
    if !config.reports_index_key.ends_with(".json") {
        report.warn("reports_index_key", "Manifest key does not end in .json");
    }
}
