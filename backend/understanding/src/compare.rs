//! Label/description comparison delegated to a text-generation model.
//!
//! The model is asked for a strict JSON verdict. Anything that parses as JSON
//! is kept verbatim; anything else becomes a degraded evaluation.

use std::sync::Arc;

use accessplus_core::{Evaluation, LlmProvider, LlmRequest, ReportError};
use tracing::{info, warn};

pub const SYSTEM_PROMPT: &str =
    "You are a JSON-only analyst comparing Rekognition output with a citizen description.";

/// Build the user prompt for one comparison.
///
/// Deterministic for a given input: labels are embedded as a JSON array in
/// detector order, the description is trimmed and quoted.
pub fn build_prompt(labels: &[String], description: &str) -> String {
    let labels = serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"Amazon Rekognition produced labels for a photo, and a citizen described the same photo in their own words.

Detected labels: {labels}
Citizen description: "{description}"

Judge how well the labels support the description. Reply with strictly valid JSON and nothing else:
{{
  "match_summary": "<one sentence on how close they are>",
  "mismatches": ["<each major discrepancy>"],
  "confidence": <integer 0-100, your confidence that they describe the same scene>
}}"#,
        description = description.trim()
    )
}

/// Parse a model reply, falling back to a degraded evaluation on invalid JSON.
pub fn parse_reply(reply: &str) -> Evaluation {
    let raw = reply.trim();
    match serde_json::from_str(raw) {
        Ok(value) => Evaluation::Parsed(value),
        Err(e) => {
            warn!(error = %e, "Model reply was not valid JSON; using degraded evaluation");
            Evaluation::Degraded { raw: raw.to_string() }
        }
    }
}

/// Compares detected labels against a citizen description.
#[derive(Clone)]
pub struct Comparator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl Comparator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one comparison. Provider failures are terminal; malformed replies are not.
    pub async fn compare(
        &self,
        labels: &[String],
        description: &str,
    ) -> Result<Evaluation, ReportError> {
        let request = LlmRequest {
            model: self.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_prompt(labels, description),
            json_mode: true,
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| ReportError::llm(self.provider.name(), &e))?;

        let evaluation = parse_reply(&response.content);
        info!(
            provider = %response.provider,
            model = %response.model,
            tokens = response.tokens_used,
            latency_ms = response.latency_ms,
            degraded = evaluation.is_degraded(),
            "Comparison complete"
        );
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use serde_json::json;

    fn labels() -> Vec<String> {
        vec!["Ramp".into(), "Sidewalk".into(), "Pavement".into()]
    }

    #[test]
    fn prompt_embeds_labels_and_description() {
        let prompt = build_prompt(&labels(), "  ramp with tactile paving\n");
        assert!(prompt.contains(r#"Detected labels: ["Ramp","Sidewalk","Pavement"]"#));
        assert!(prompt.contains(r#"Citizen description: "ramp with tactile paving""#));
        assert!(prompt.contains("\"match_summary\""));
        assert_eq!(prompt, build_prompt(&labels(), "ramp with tactile paving"));
    }

    #[test]
    fn well_formed_reply_is_kept_verbatim() {
        let eval = parse_reply(r#"{"match_summary":"Good match","mismatches":[],"confidence":92}"#);
        assert_eq!(
            eval,
            Evaluation::Parsed(json!({"match_summary": "Good match", "mismatches": [], "confidence": 92}))
        );
    }

    #[test]
    fn prose_reply_degrades() {
        let eval = parse_reply("The photo probably shows a ramp.");
        assert!(eval.is_degraded());
        let value = eval.into_value();
        assert_eq!(value["confidence"], 0);
        assert_eq!(value["mismatches"], json!([]));
        assert_eq!(value["match_summary"], "The photo probably shows a ramp.");
    }

    #[test]
    fn object_missing_fields_passes_through() {
        let eval = parse_reply(r#"{"verdict":"unclear"}"#);
        assert_eq!(eval, Evaluation::Parsed(json!({"verdict": "unclear"})));
    }

    #[tokio::test]
    async fn compare_sends_json_mode_request() {
        let provider = Arc::new(MockProvider::new("mock").with_response(
            r#"{"match_summary":"Good match","mismatches":[],"confidence":92}"#,
        ));
        let comparator = Comparator::new(provider.clone(), "gpt-4o-mini");
        let eval = comparator
            .compare(&labels(), "ramp with tactile paving")
            .await
            .unwrap();
        assert_eq!(eval.confidence(), Some(92));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json_mode);
        assert_eq!(requests[0].system_prompt, SYSTEM_PROMPT);
        assert_eq!(requests[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn provider_error_is_terminal() {
        let comparator = Comparator::new(Arc::new(MockProvider::failing("mock", "401")), "m");
        let err = comparator.compare(&labels(), "ramp").await.unwrap_err();
        assert!(matches!(err, ReportError::Llm { .. }));
    }
}
