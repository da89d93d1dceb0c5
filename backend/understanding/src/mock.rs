//! In-process doubles for the vision and text-generation backends.

use std::sync::Mutex;

use accessplus_core::{DetectedLabel, LlmProvider, LlmRequest, LlmResponse, VisionProvider};
use anyhow::{bail, Result};
use async_trait::async_trait;

/// A mock vision backend returning a fixed label set.
pub struct MockVision {
    labels: Vec<DetectedLabel>,
    error: Option<String>,
    calls: Mutex<Vec<(u32, f32)>>,
}

impl MockVision {
    pub fn new(labels: Vec<DetectedLabel>) -> Self {
        Self {
            labels,
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    /// `(max_labels, min_confidence)` for every call so far.
    pub fn calls(&self) -> Vec<(u32, f32)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &str {
        "mock"
    }

    async fn detect_labels(
        &self,
        _image: &[u8],
        max_labels: u32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((max_labels, min_confidence));
        }
        if let Some(message) = &self.error {
            bail!("{message}");
        }
        Ok(self.labels.clone())
    }
}

/// A mock LLM provider that returns canned responses and records requests.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    error: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(name)
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, req: &LlmRequest) -> Result<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.clone());
        }
        if let Some(message) = &self.error {
            bail!("{message}");
        }
        Ok(LlmResponse {
            content: self.fixed_response.clone().unwrap_or_else(|| "Mock response".to_string()),
            provider: self.name.clone(),
            model: req.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
