use thiserror::Error;

/// Top-level error type for report submission and retrieval.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("label detection failed ({provider}): {message}")]
    Vision { provider: String, message: String },

    #[error("LLM provider error ({provider}): {message}")]
    Llm { provider: String, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("Unable to load reports manifest.")]
    ManifestUnavailable(String),

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("no object stored at key {0}")]
    MissingObject(String),

    #[error("Missing static asset: {0}")]
    MissingAsset(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    pub fn vision(provider: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::Vision {
            provider: provider.into(),
            message: format!("{err:#}"),
        }
    }

    pub fn llm(provider: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::Llm {
            provider: provider.into(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_error_hides_detail() {
        let err = ReportError::ManifestUnavailable("AccessDenied".into());
        assert_eq!(err.to_string(), "Unable to load reports manifest.");
    }

    #[test]
    fn vision_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("throttled").context("DetectLabels call failed");
        let err = ReportError::vision("rekognition", &inner);
        let msg = err.to_string();
        assert!(msg.contains("rekognition"));
        assert!(msg.contains("throttled"));
    }

    #[test]
    fn missing_object_names_the_key() {
        let err = ReportError::MissingObject("ramp.jpg".into());
        assert_eq!(err.to_string(), "no object stored at key ramp.jpg");
    }
}
