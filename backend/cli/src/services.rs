//! Builds the external-service clients from configuration.

use std::sync::Arc;

use accessplus_config::Config;
use accessplus_core::{LlmProvider, ObjectStorage, VisionProvider};
use accessplus_storage::{sdk_credentials, ImageStore, ReportIndex, S3Storage};
use accessplus_understanding::{Comparator, LabelDetector, OpenAiProvider, RekognitionProvider};
use anyhow::Result;
use tracing::{info, warn};

/// Client handles shared by every command. Created once, reused for every request.
pub struct Services {
    pub vision: Arc<dyn VisionProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Services {
    /// S3 and Rekognition resolve credentials through the same SDK chain.
    pub async fn connect(config: &Config) -> Result<Self> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        if sdk_config.credentials_provider().is_none() {
            warn!("No AWS credential provider configured; S3 falls back to AWS_* variables");
        }

        let storage = S3Storage::connect(
            &config.bucket,
            &config.aws_region,
            sdk_config.credentials_provider().map(sdk_credentials),
        )?;
        let vision = RekognitionProvider::from_sdk_config(&sdk_config);
        let llm = OpenAiProvider::new(config.openai_api_key.clone())
            .with_base_url(config.openai_base_url.clone());
        info!(
            region = %config.aws_region,
            bucket = %config.bucket,
            model = %config.openai_model,
            "Connected service clients"
        );
        Ok(Self {
            vision: Arc::new(vision),
            llm: Arc::new(llm),
            storage: Arc::new(storage),
        })
    }

    pub fn detector(&self, min_confidence: f32, max_labels: u32) -> LabelDetector {
        LabelDetector::new(self.vision.clone(), min_confidence, max_labels)
    }

    pub fn comparator(&self, model: &str) -> Comparator {
        Comparator::new(self.llm.clone(), model)
    }

    pub fn images(&self) -> ImageStore {
        ImageStore::new(self.storage.clone())
    }

    pub fn index(&self, key: &str) -> ReportIndex {
        ReportIndex::new(self.storage.clone(), key)
    }
}
