use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::util::expand_tilde;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            temperature: 0.9,
            max_tokens: 600,
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub max_files: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { max_files: 200 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub version: u32,
    pub bind_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
    pub llm: LlmConfig,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            bind_address: "127.0.0.1:8787".into(),
            catalog_path: None,
            llm: LlmConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("CREATIONX_CONFIG") {
        return Some(PathBuf::from(expand_tilde(&explicit)));
    }
    dirs::home_dir().map(|h| h.join(".creationx").join("config.json"))
}

impl AppConfig {
    /// Reads the config file (defaults when absent) and applies env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                let config = Self::from_json_str(&content).map_err(|e| {
                    AppError::Custom(format!("Invalid config {}: {e}", path.display()))
                })?;
                tracing::info!(path = %path.display(), "config loaded");
                config
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies `CREATIONX_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = lookup("CREATIONX_BIND") {
            self.bind_address = bind;
        }
        if let Some(path) = lookup("CREATIONX_CATALOG") {
            self.catalog_path = Some(path);
        }
        if let Some(key) = lookup("CREATIONX_LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("CREATIONX_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = self.catalog_path.as_mut() {
            *path = expand_tilde(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "bindAddress": "0.0.0.0:9000", "llm": { "model": "local-model" } }"#,
        )
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.export.max_files, 200);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(AppConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CREATIONX_BIND", "0.0.0.0:1234"),
            ("CREATIONX_CATALOG", "/srv/catalog.json"),
            ("CREATIONX_LLM_API_KEY", ""),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.bind_address, "0.0.0.0:1234");
        assert_eq!(config.catalog_path.as_deref(), Some("/srv/catalog.json"));
        // Blank values do not count as set.
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_api_key_is_not_serialized_when_absent() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        assert!(!json.contains("apiKey"));
        assert!(json.contains("bindAddress"));
    }
}
