//! Environment-backed configuration.
//!
//! Every setting comes from a process environment variable. Empty values are
//! treated the same as unset ones. The bucket name and the OpenAI key are
//! required; everything else has a default from [`crate::defaults`].

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::defaults::*;

/// Errors raised while reading configuration. All of them stop startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Set {vars} {purpose}")]
    Missing { vars: String, purpose: &'static str },

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Failed to load .env file: {0}")]
    EnvFile(String),
}

/// AccessPlus runtime configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// AWS region for S3 and Rekognition
    pub aws_region: String,
    /// Bucket holding photos and the reports manifest
    pub bucket: String,
    /// Object key of the reports manifest
    pub reports_index_key: String,
    /// Minimum label confidence, 0-100
    pub min_confidence: f32,
    /// Maximum labels per image
    pub max_labels: u32,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Front-end pages and assets
    pub static_dir: PathBuf,
    /// Rolling NDJSON log directory
    pub log_dir: PathBuf,
    /// Log level when RUST_LOG is unset
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a provided map (useful for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(vars, name);

        let bucket = get("ACCESSIBILITYPLUS_BUCKET")
            .or_else(|| get("S3_BUCKET_NAME"))
            .ok_or(ConfigError::Missing {
                vars: "ACCESSIBILITYPLUS_BUCKET or S3_BUCKET_NAME".into(),
                purpose: "for storage.",
            })?
            .to_string();

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or(ConfigError::Missing {
                vars: "OPENAI_API_KEY".into(),
                purpose: "to enable GPT-based checks.",
            })?
            .to_string();

        let string_or = |name: &str, default: &str| get(name).unwrap_or(default).to_string();

        Ok(Self {
            aws_region: string_or("AWS_REGION", DEFAULT_AWS_REGION),
            bucket,
            reports_index_key: string_or("REPORTS_INDEX_KEY", DEFAULT_REPORTS_INDEX_KEY),
            min_confidence: parse_or(
                "REKOGNITION_MIN_CONFIDENCE",
                get("REKOGNITION_MIN_CONFIDENCE"),
                DEFAULT_MIN_CONFIDENCE,
            )?,
            max_labels: parse_or(
                "REKOGNITION_MAX_LABELS",
                get("REKOGNITION_MAX_LABELS"),
                DEFAULT_MAX_LABELS,
            )?,
            openai_api_key,
            openai_model: string_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_base_url: string_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            bind_address: string_or("ACCESSPLUS_BIND", DEFAULT_BIND_ADDRESS),
            port: parse_or("ACCESSPLUS_PORT", get("ACCESSPLUS_PORT"), DEFAULT_PORT)?,
            static_dir: PathBuf::from(string_or("ACCESSPLUS_STATIC_DIR", DEFAULT_STATIC_DIR)),
            log_dir: PathBuf::from(string_or("ACCESSPLUS_LOG_DIR", DEFAULT_LOG_DIR)),
            log_level: string_or("RUST_LOG", DEFAULT_LOG_LEVEL),
        })
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_or<T>(var: &'static str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
