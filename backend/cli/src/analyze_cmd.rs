//! CLI Analyze Command
//!
//! One-shot label detection and comparison for a local file or a bucket
//! object. Nothing is persisted.

use std::path::PathBuf;

use accessplus_config::Config;
use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::services::Services;

/// Where the image comes from.
pub enum ImageSource {
    File(PathBuf),
    Key(String),
}

pub async fn run(
    config: &Config,
    services: &Services,
    source: ImageSource,
    description: &str,
    min_confidence: f32,
    max_labels: u32,
) -> Result<()> {
    let output = analyze(config, services, source, description, min_confidence, max_labels).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `{labels, ai_verdict, degraded}` for one image.
pub async fn analyze(
    config: &Config,
    services: &Services,
    source: ImageSource,
    description: &str,
    min_confidence: f32,
    max_labels: u32,
) -> Result<Value> {
    let image = match &source {
        ImageSource::File(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        ImageSource::Key(key) => services.images().fetch(key).await?.to_vec(),
    };

    let labels = services
        .detector(min_confidence, max_labels)
        .detect(&image)
        .await?;
    let evaluation = services
        .comparator(&config.openai_model)
        .compare(&labels, description)
        .await?;

    let degraded = evaluation.is_degraded();
    Ok(json!({
        "labels": labels,
        "ai_verdict": evaluation.into_value(),
        "degraded": degraded,
    }))
}
