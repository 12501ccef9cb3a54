use anyhow::{Context, Result};
use extract::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// JSON file holding the extractor's component options.
    pub extractor_config: Option<PathBuf>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            extractor_config: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            extractor_config: get("EXTRACTOR_CONFIG").filter(|p| !p.is_empty()).map(PathBuf::from),
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    pub async fn load_extractor_config(&self) -> Result<ExtractorConfig> {
        let Some(path) = &self.extractor_config else {
            return Ok(ExtractorConfig::default());
        };

        let raw = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read extractor config: {:?}", path))?;
        ExtractorConfig::from_json_str(&raw)
    }
}
