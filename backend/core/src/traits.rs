use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::types::DetectedLabel;

/// Trait for image-recognition backends used by the label detector.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name (e.g., "rekognition", "mock").
    fn name(&self) -> &str;

    /// Detect labels in raw image bytes.
    ///
    /// `max_labels` and `min_confidence` are forwarded to the backend; callers
    /// must not assume the backend honours them.
    async fn detect_labels(
        &self,
        image: &[u8],
        max_labels: u32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>>;
}

/// Trait for text-generation providers used by the comparator.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    /// Ask the provider to constrain output to a single JSON object.
    pub json_mode: bool,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

/// Flat key/value object storage, scoped to a single bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Backend name (e.g., "s3", "memory").
    fn name(&self) -> &str;

    /// List object keys, optionally restricted to a prefix.
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>>;

    /// Fetch an object. A missing key is `Ok(None)`, not an error.
    async fn get_object(&self, key: &str) -> Result<Option<Bytes>>;

    /// Write an object, replacing whatever is stored under `key`.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    /// Time-limited GET URL for `key`.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String>;

    /// Permanent URL for `key`, valid only under a public-read bucket policy.
    fn public_url(&self, key: &str) -> String;
}
