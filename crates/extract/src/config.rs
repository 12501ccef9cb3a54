use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Environment variable that overrides the configured access token.
pub const ACCESS_TOKEN_ENV: &str = "NEURALSPACE_ACCESS_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Language code sent with every request.
    pub language: String,
    /// Token sent in the `authorization` header. Overridden by `NEURALSPACE_ACCESS_TOKEN`.
    pub access_token: Option<String>,
    /// Entity types to keep. `None` or empty keeps everything the service returns.
    #[serde(alias = "dimension")]
    pub dimensions: Option<HashSet<String>>,
    /// Seconds allowed for the whole request/response cycle.
    pub timeout: f64,
    /// Replace `value` with its normalized form (`additional_info` stays raw).
    pub normalize_values: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            access_token: None,
            dimensions: None,
            timeout: 3.0,
            normalize_values: false,
        }
    }
}

impl ExtractorConfig {
    /// Merge a component option map over the defaults.
    ///
    /// Keys that are absent keep their default value, unknown keys are ignored.
    pub fn from_overrides(overrides: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let config: Self = serde_json::from_value(serde_json::Value::Object(overrides))
            .context("Invalid NeuralSpace extractor configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let overrides: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).context("Extractor configuration must be a JSON object")?;
        Self::from_overrides(overrides)
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            anyhow::bail!("`language` must not be empty");
        }
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            anyhow::bail!("`timeout` must be a positive number of seconds, got {}", self.timeout);
        }
        Duration::try_from_secs_f64(self.timeout)
            .context(format!("`timeout` of {} seconds is out of range", self.timeout))?;
        Ok(())
    }

    /// Falls back to the default for values `validate` would reject.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .unwrap_or(Duration::from_secs(3))
    }

    /// Environment token wins when set and non-empty, then the configured one.
    pub fn resolve_access_token(&self, env_token: Option<&str>) -> Option<String> {
        resolve_access_token(env_token, self.access_token.as_deref())
    }
}

pub fn resolve_access_token(env_token: Option<&str>, configured: Option<&str>) -> Option<String> {
    env_token
        .filter(|t| !t.is_empty())
        .or(configured.filter(|t| !t.is_empty()))
        .map(str::to_string)
}

/// Read the override token from the process environment.
pub fn env_access_token() -> Option<String> {
    std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.access_token, None);
        assert_eq!(config.dimensions, None);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(!config.normalize_values);
    }

    #[test]
    fn test_overrides_merge_with_defaults() {
        let config = ExtractorConfig::from_overrides(overrides(json!({
            "language": "hi",
            "timeout": 1.5,
            "name": "ignored by the extractor",
        })))
        .unwrap();

        assert_eq!(config.language, "hi");
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert_eq!(config.access_token, None);
    }

    #[test]
    fn test_dimension_key_alias() {
        let singular = ExtractorConfig::from_overrides(overrides(json!({
            "dimension": ["date", "money"],
        })))
        .unwrap();
        let plural = ExtractorConfig::from_json_str(r#"{"dimensions": ["money", "date"]}"#).unwrap();

        assert_eq!(singular.dimensions, plural.dimensions);
        assert!(singular.dimensions.unwrap().contains("date"));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(ExtractorConfig::from_overrides(overrides(json!({"timeout": 0}))).is_err());
        assert!(ExtractorConfig::from_overrides(overrides(json!({"timeout": -2.0}))).is_err());
        assert!(ExtractorConfig::from_overrides(overrides(json!({"timeout": "soon"}))).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        assert!(ExtractorConfig::from_overrides(overrides(json!({"timeout": 1e20}))).is_err());

        let config = ExtractorConfig {
            timeout: 1e20,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
        // never panics, even on an unvalidated config
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_token_precedence() {
        assert_eq!(resolve_access_token(Some("env"), Some("cfg")), Some("env".to_string()));
        assert_eq!(resolve_access_token(Some(""), Some("cfg")), Some("cfg".to_string()));
        assert_eq!(resolve_access_token(None, Some("cfg")), Some("cfg".to_string()));
        assert_eq!(resolve_access_token(None, Some("")), None);
        assert_eq!(resolve_access_token(None, None), None);
    }
}
