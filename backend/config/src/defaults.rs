//! Default values applied when an optional variable is unset.

pub const DEFAULT_AWS_REGION: &str = "us-east-1";

pub const DEFAULT_REPORTS_INDEX_KEY: &str = "reports/index.json";

/// Minimum Rekognition confidence for the HTTP server.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 70.0;

/// Maximum labels requested per image for the HTTP server.
pub const DEFAULT_MAX_LABELS: u32 = 15;

/// Stricter settings used by the one-shot `analyze` command.
pub const ANALYZE_MIN_CONFIDENCE: f32 = 80.0;
pub const ANALYZE_MAX_LABELS: u32 = 10;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_STATIC_DIR: &str = "static";

pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_LOG_LEVEL: &str = "info";
