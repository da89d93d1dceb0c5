//! The report pipeline: detect → compare → store photo → append to manifest.
//!
//! Steps run strictly in order. A failure at any step ends the submission;
//! nothing written by earlier steps is rolled back.

use accessplus_core::{Evaluation, Report, ReportError};
use accessplus_logging::{EventLogger, ReportEvent};
use accessplus_storage::{ImageStore, ReportIndex};
use accessplus_understanding::{Comparator, LabelDetector};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, instrument};

/// One citizen upload, already pulled out of the HTTP form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub description: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct ReportPipeline {
    detector: LabelDetector,
    comparator: Comparator,
    images: ImageStore,
    index: ReportIndex,
}

impl ReportPipeline {
    pub fn new(
        detector: LabelDetector,
        comparator: Comparator,
        images: ImageStore,
        index: ReportIndex,
    ) -> Self {
        Self {
            detector,
            comparator,
            images,
            index,
        }
    }

    pub fn index(&self) -> &ReportIndex {
        &self.index
    }

    /// Label an image and compare the labels with a description, without persisting.
    pub async fn analyze(
        &self,
        image: &[u8],
        description: &str,
    ) -> Result<(Vec<String>, Evaluation), ReportError> {
        let labels = self.detector.detect(image).await?;
        let evaluation = self.comparator.compare(&labels, description).await?;
        Ok((labels, evaluation))
    }

    /// Run the full pipeline and return the persisted report.
    #[instrument(skip_all, fields(bytes = submission.data.len()))]
    pub async fn submit(&self, submission: Submission) -> Result<Report, ReportError> {
        let report_id = Report::new_id();
        EventLogger::log_event(
            &report_id,
            ReportEvent::Received {
                description: submission.description.clone(),
                image_bytes: submission.data.len(),
            },
        );

        let result = self.run(&report_id, submission).await;
        if let Err(e) = &result {
            EventLogger::log_event(
                &report_id,
                ReportEvent::Failed {
                    stage: stage_of(e).to_string(),
                    error_msg: e.to_string(),
                },
            );
        }
        result
    }

    async fn run(&self, report_id: &str, submission: Submission) -> Result<Report, ReportError> {
        let (labels, evaluation) = self.analyze(&submission.data, &submission.description).await?;
        EventLogger::log_event(report_id, ReportEvent::LabelsDetected { labels: labels.clone() });
        EventLogger::log_event(
            report_id,
            ReportEvent::Evaluated {
                confidence: evaluation.confidence(),
                degraded: evaluation.is_degraded(),
            },
        );

        let image = self
            .images
            .store(
                report_id,
                submission.filename.as_deref(),
                submission.content_type.as_deref(),
                submission.data,
            )
            .await?;
        EventLogger::log_event(report_id, ReportEvent::Stored { key: image.key.clone() });

        let report = Report {
            id: report_id.to_string(),
            description: submission.description,
            latitude: submission.latitude,
            longitude: submission.longitude,
            labels,
            image,
            ai_verdict: evaluation.into_value(),
            created_at: Utc::now(),
        };

        let total = self.index.append(report.clone()).await?;
        info!(report_id, total, "Report finalized");
        Ok(report)
    }
}

fn stage_of(err: &ReportError) -> &'static str {
    match err {
        ReportError::Vision { .. } => "detect",
        ReportError::Llm { .. } => "compare",
        ReportError::Storage(_) => "store",
        ReportError::ManifestUnavailable(_) => "manifest",
        _ => "submit",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use accessplus_core::{DetectedLabel, ObjectStorage};
    use accessplus_storage::MemoryStorage;
    use accessplus_understanding::{MockProvider, MockVision};
    use serde_json::json;
    use std::sync::Arc;

    pub(crate) const GOOD_REPLY: &str =
        r#"{"match_summary":"Good match","mismatches":[],"confidence":92}"#;

    pub(crate) struct Harness {
        pub pipeline: ReportPipeline,
        pub storage: Arc<MemoryStorage>,
        pub llm: Arc<MockProvider>,
    }

    pub(crate) fn harness(reply: &str) -> Harness {
        let vision = Arc::new(MockVision::new(vec![
            DetectedLabel::new("Ramp", 98.2),
            DetectedLabel::new("Sidewalk", 91.0),
            DetectedLabel::new("Pavement", 80.0),
        ]));
        let llm = Arc::new(MockProvider::new("mock").with_response(reply));
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = ReportPipeline::new(
            LabelDetector::new(vision, 70.0, 15),
            Comparator::new(llm.clone(), "gpt-4o-mini"),
            ImageStore::new(storage.clone()),
            ReportIndex::new(storage.clone(), "reports/index.json"),
        );
        Harness {
            pipeline,
            storage,
            llm,
        }
    }

    fn submission(description: &str) -> Submission {
        Submission {
            description: description.into(),
            filename: Some("ramp.png".into()),
            content_type: Some("image/png".into()),
            data: Bytes::from_static(b"\x89PNG-bytes"),
            latitude: Some(40.7),
            longitude: None,
        }
    }

    #[tokio::test]
    async fn end_to_end_report_is_persisted() {
        let h = harness(GOOD_REPLY);
        let report = h
            .pipeline
            .submit(submission("ramp with tactile paving"))
            .await
            .unwrap();

        assert_eq!(report.labels, vec!["Ramp", "Sidewalk", "Pavement"]);
        assert_eq!(
            report.ai_verdict,
            json!({"match_summary": "Good match", "mismatches": [], "confidence": 92})
        );
        assert_eq!(report.image.key, format!("reports/{}/photo.png", report.id));
        assert_eq!(report.latitude, Some(40.7));
        assert!(report.longitude.is_none());

        let prompt = &h.llm.requests()[0].user_prompt;
        assert!(prompt.contains(r#"["Ramp","Sidewalk","Pavement"]"#));
        assert!(prompt.contains("\"ramp with tactile paving\""));

        let photo = h.storage.get_object(&report.image.key).await.unwrap().unwrap();
        assert_eq!(photo.as_ref(), b"\x89PNG-bytes");

        let stored = h.pipeline.index().load().await.unwrap();
        assert_eq!(stored, vec![report]);
    }

    #[tokio::test]
    async fn unparsable_reply_still_persists_degraded_report() {
        let h = harness("Sorry, I can't tell.");
        let report = h.pipeline.submit(submission("curb cut")).await.unwrap();
        assert_eq!(report.confidence(), Some(0));
        assert_eq!(report.ai_verdict["mismatches"], json!([]));
        assert_eq!(report.ai_verdict["match_summary"], "Sorry, I can't tell.");
    }

    #[tokio::test]
    async fn llm_failure_writes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = ReportPipeline::new(
            LabelDetector::new(Arc::new(MockVision::new(Vec::new())), 70.0, 15),
            Comparator::new(Arc::new(MockProvider::failing("mock", "503")), "m"),
            ImageStore::new(storage.clone()),
            ReportIndex::new(storage.clone(), "reports/index.json"),
        );
        let err = pipeline.submit(submission("ramp")).await.unwrap_err();
        assert!(matches!(err, ReportError::Llm { .. }));
        assert!(storage.list_keys(None).await.unwrap().is_empty());
    }
}
