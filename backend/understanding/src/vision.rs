//! Label detection: tag image contents using Amazon Rekognition.

use std::sync::Arc;

use accessplus_core::{DetectedLabel, ReportError, VisionProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_rekognition::{primitives::Blob, types::Image, Client};
use tracing::{debug, info};

/// Rekognition `DetectLabels` backend.
pub struct RekognitionProvider {
    client: Client,
}

impl RekognitionProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an already-loaded SDK config.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl VisionProvider for RekognitionProvider {
    fn name(&self) -> &str {
        "rekognition"
    }

    async fn detect_labels(
        &self,
        image: &[u8],
        max_labels: u32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>> {
        debug!(bytes = image.len(), max_labels, min_confidence, "Calling Rekognition DetectLabels");
        let response = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .max_labels(i32::try_from(max_labels).unwrap_or(i32::MAX))
            .min_confidence(min_confidence)
            .send()
            .await
            .context("Rekognition DetectLabels request failed")?;

        Ok(response
            .labels()
            .iter()
            .filter_map(|label| {
                let name = label.name()?;
                Some(DetectedLabel::new(name, label.confidence().unwrap_or(0.0)))
            })
            .collect())
    }
}

/// Keep labels at or above `min_confidence`, in backend order, capped at `max_labels`.
pub fn filter_labels(labels: Vec<DetectedLabel>, min_confidence: f32, max_labels: u32) -> Vec<String> {
    labels
        .into_iter()
        .filter(|label| label.confidence >= min_confidence)
        .take(max_labels as usize)
        .map(|label| label.name)
        .collect()
}

/// Detector bound to a backend and its threshold settings.
#[derive(Clone)]
pub struct LabelDetector {
    provider: Arc<dyn VisionProvider>,
    pub min_confidence: f32,
    pub max_labels: u32,
}

impl LabelDetector {
    pub fn new(provider: Arc<dyn VisionProvider>, min_confidence: f32, max_labels: u32) -> Self {
        Self {
            provider,
            min_confidence,
            max_labels,
        }
    }

    /// Detect labels and re-apply the threshold and cap locally.
    ///
    /// Backend failures are terminal: no retry and no partial result.
    pub async fn detect(&self, image: &[u8]) -> Result<Vec<String>, ReportError> {
        let raw = self
            .provider
            .detect_labels(image, self.max_labels, self.min_confidence)
            .await
            .map_err(|e| ReportError::vision(self.provider.name(), &e))?;

        let labels = filter_labels(raw, self.min_confidence, self.max_labels);
        info!(provider = self.provider.name(), count = labels.len(), "Detected labels");
        Ok(labels)
    }
}
