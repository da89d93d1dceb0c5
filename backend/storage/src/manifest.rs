//! The reports manifest: one JSON array object listing every report.
//!
//! Updates are read-modify-write of the whole array with no locking, so two
//! concurrent appends can lose one of the reports.

use std::sync::Arc;

use accessplus_core::{ObjectStorage, Report, ReportError};
use bytes::Bytes;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct ReportIndex {
    storage: Arc<dyn ObjectStorage>,
    key: String,
}

impl ReportIndex {
    pub fn new(storage: Arc<dyn ObjectStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All reports, oldest first. A missing or empty manifest is an empty list.
    pub async fn load(&self) -> Result<Vec<Report>, ReportError> {
        let body = self.storage.get_object(&self.key).await.map_err(|e| {
            error!(key = %self.key, error = %format!("{e:#}"), "Failed to read reports manifest");
            ReportError::ManifestUnavailable(format!("{e:#}"))
        })?;

        let Some(body) = body else {
            debug!(key = %self.key, "Reports manifest does not exist yet");
            return Ok(Vec::new());
        };
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&body).map_err(|e| {
            error!(key = %self.key, error = %e, "Reports manifest is not a valid report array");
            ReportError::ManifestUnavailable(e.to_string())
        })
    }

    /// Overwrite the manifest with `reports`.
    pub async fn save(&self, reports: &[Report]) -> Result<(), ReportError> {
        let body = serde_json::to_vec_pretty(reports)
            .map_err(|e| ReportError::Storage(e.to_string()))?;
        self.storage
            .put_object(&self.key, Bytes::from(body), "application/json")
            .await
            .map_err(|e| ReportError::Storage(format!("{e:#}")))
    }

    /// Append one report. Returns the manifest length after the write.
    pub async fn append(&self, report: Report) -> Result<usize, ReportError> {
        let mut reports = self.load().await?;
        reports.push(report);
        self.save(&reports).await?;
        info!(key = %self.key, total = reports.len(), "Updated reports manifest");
        Ok(reports.len())
    }

    /// Look up one report by id.
    pub async fn find(&self, id: &str) -> Result<Report, ReportError> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ReportError::NotFound(id.to_string()))
    }
}
