//! Open-ended idea generation through an OpenAI-compatible chat completion API.

use std::time::Duration;

use crate::catalog::Blockage;
use crate::config::LlmConfig;
use crate::error::{AppError, Result};

const SYSTEM_PROMPT: &str = "Eres CreationX, un coach de creatividad cercano y concreto. \
Responde en español con una lista breve de ideas originales y accionables, \
sin introducciones largas.";

#[derive(Clone)]
pub struct IdeaClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl IdeaClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("CreationX/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Asks the model for ideas about `prompt`, framed by the user's blockage when known.
    pub async fn generate(&self, prompt: &str, blockage: Option<&Blockage>) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::InvalidInput("prompt is required".into()));
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Unavailable("idea generation is not configured".into()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = request_body(&self.config, prompt, blockage);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "idea generation rejected upstream");
            return Err(AppError::Upstream(format!("model endpoint returned {status}")));
        }

        let payload: serde_json::Value = response.json().await?;
        extract_content(&payload)
            .ok_or_else(|| AppError::Upstream("model response had no content".into()))
    }
}

fn system_prompt(blockage: Option<&Blockage>) -> String {
    match blockage {
        Some(b) => format!(
            "{SYSTEM_PROMPT} La persona está atravesando un bloqueo de tipo \"{}\"; \
             el objetivo es: {}",
            b.label, b.goal
        ),
        None => SYSTEM_PROMPT.to_string(),
    }
}

fn request_body(config: &LlmConfig, prompt: &str, blockage: Option<&Blockage>) -> serde_json::Value {
    serde_json::json!({
        "model": config.model,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
        "messages": [
            { "role": "system", "content": system_prompt(blockage) },
            { "role": "user", "content": prompt },
        ],
    })
}

fn extract_content(payload: &serde_json::Value) -> Option<String> {
    let content = payload["choices"][0]["message"]["content"].as_str()?.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blockage() -> Blockage {
        Blockage {
            id: "perfeccionismo".into(),
            label: "Perfeccionismo".into(),
            goal: "Avanzar con versiones imperfectas.".into(),
            techniques: vec!["prototipo_rapido".into()],
            keywords: vec![],
        }
    }

    #[test]
    fn test_request_body_carries_blockage_context() {
        let config = LlmConfig::default();
        let body = request_body(&config, "Ideas para un cartel", Some(&blockage()));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][1]["content"], "Ideas para un cartel");
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.contains("Perfeccionismo"));
        assert!(system.contains("Avanzar con versiones imperfectas."));
    }

    #[test]
    fn test_extract_content() {
        let ok = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  1. Idea\n" } }]
        });
        assert_eq!(extract_content(&ok).as_deref(), Some("1. Idea"));
        assert_eq!(extract_content(&serde_json::json!({ "choices": [] })), None);
        let blank = serde_json::json!({ "choices": [{ "message": { "content": " " } }] });
        assert_eq!(extract_content(&blank), None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_unavailable() {
        let client = IdeaClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client.generate("algo", None).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
        let err = client.generate("  ", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
