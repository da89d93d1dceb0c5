//! `accessplus-config`: runtime configuration for the reporter.
//!
//! Provides:
//! - Typed config loaded from environment variables (and `.env`)
//! - Default values for every optional setting
//! - Validation with errors and warnings
//! - Redacted snapshots for safe logging

pub mod defaults;
pub mod env;
pub mod redact;
pub mod validation;

pub use env::{Config, ConfigError};
pub use redact::redact;
pub use validation::{validate, ConfigValidationError, ValidationReport};

/// Load `.env` (if present) and read the environment.
pub fn load() -> Result<Config, ConfigError> {
    apply_env_file(dotenvy::dotenv())?;
    Config::from_env()
}

/// A missing `.env` is fine; a file that exists but can't be read or parsed is not.
fn apply_env_file<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No .env file found");
            Ok(())
        }
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

/// Validate a loaded config. Warnings are logged; any error is fatal.
pub fn check(config: &Config) -> Result<(), ConfigError> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        return Err(ConfigError::Validation(report.summary()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_env_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("accessplus-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let result = dotenvy::from_path("/nonexistent/accessplus/.env");
        assert!(apply_env_file(result).is_ok());
    }

    #[test]
    fn malformed_env_file_is_an_error() {
        let path = write_env_file(
            "broken",
            "ACCESSPLUS_ENVFILE_BUCKET=a11y\nBROKEN LINE WITHOUT EQUALS\nACCESSPLUS_ENVFILE_KEY=sk-real\n",
        );
        let err = apply_env_file(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
        assert!(err.to_string().starts_with("Failed to load .env file"));
    }

    #[test]
    fn valid_env_file_is_applied() {
        let path = write_env_file("valid", "ACCESSPLUS_ENVFILE_MODEL=gpt-4o\n");
        apply_env_file(dotenvy::from_path(&path)).unwrap();
        assert_eq!(
            std::env::var("ACCESSPLUS_ENVFILE_MODEL").as_deref(),
            Ok("gpt-4o")
        );
    }
}
