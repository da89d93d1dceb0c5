//! Config redaction: produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

/// Field-name suffixes that mark a value as secret.
static SENSITIVE_SUFFIXES: &[&str] = &["api_key", "apikey", "token", "secret", "password"];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_SUFFIXES.iter().any(|s| key.ends_with(s))
}

/// Redact a config JSON value, masking sensitive string fields.
///
/// The first four characters are kept as a hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            let hint = if s.chars().count() > 4 {
                format!("{}***", s.chars().take(4).collect::<String>())
            } else {
                "***".to_string()
            };
            Value::String(hint)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({ "openai_api_key": "sk-abcdef123456", "bucket": "a11y" });
        let redacted = redact(&v);
        let key = redacted["openai_api_key"].as_str().unwrap();
        assert_eq!(key, "sk-a***");
        assert_eq!(redacted["bucket"], "a11y");
    }

    #[test]
    fn short_secret_fully_masked() {
        let v = json!({ "token": "abc" });
        assert_eq!(redact(&v)["token"], "***");
    }

    #[test]
    fn passthrough_numbers() {
        let v = json!({ "port": 8000, "min_confidence": 70.0 });
        assert_eq!(redact(&v), v);
    }
}
