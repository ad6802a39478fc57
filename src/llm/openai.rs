//! OpenAI chat-completions client.

use super::{accept_truncated, describe, ProviderKind, SqlProvider, TEMPERATURE};
use crate::config::ProviderSettings;
use crate::error::{Result, SqlGenError};
use crate::prompt::PromptPayload;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

pub const MAX_TOKENS: u32 = 500;

#[derive(Clone)]
pub struct OpenAiClient {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    fn request_body(&self, prompt: &PromptPayload) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &prompt.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": prompt.user}));

        serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        })
    }

    async fn call(&self, prompt: &PromptPayload) -> Result<String> {
        let api_key = self.settings.credential()?;

        let response = self
            .http
            .post(&format!("{}/chat/completions", self.settings.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| SqlGenError::Provider(format!("OpenAI API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SqlGenError::Provider(format!("OpenAI API error ({}): {}", status, error_text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SqlGenError::MalformedResponse(format!("OpenAI response is not JSON: {}", e)))?;

        extract_text(&body)
    }
}

/// Pull the first choice's message content out of a chat-completions response.
pub fn extract_text(body: &Value) -> Result<String> {
    if let Some(error) = body.get("error") {
        return Err(SqlGenError::Provider(format!("OpenAI API error: {}", describe(error))));
    }

    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| {
            SqlGenError::EmptyResponse(format!("Empty choices array in OpenAI response: {}", describe(body)))
        })?;

    let content = choice.pointer("/message/content").and_then(|c| c.as_str());

    match choice.get("finish_reason").and_then(|r| r.as_str()) {
        Some("length") => return accept_truncated(ProviderKind::OpenAi, content),
        Some("content_filter") => {
            return Err(SqlGenError::Provider(
                "OpenAI response was filtered by content policy".to_string(),
            ))
        }
        _ => {}
    }

    content.map(str::to_string).ok_or_else(|| {
        SqlGenError::MalformedResponse(format!("No content in OpenAI response: {}", describe(choice)))
    })
}

#[async_trait]
impl SqlProvider for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(&self, prompt: &PromptPayload) -> Result<String> {
        match self.call(prompt).await {
            Ok(text) => {
                info!(provider = "openai", model = %self.settings.model, chars = text.len(), "OpenAI returned SQL");
                Ok(text)
            }
            Err(e) => {
                warn!(provider = "openai", kind = e.kind(), error = %e, "OpenAI generation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> OpenAiClient {
        OpenAiClient::new(ProviderSettings::new(
            ProviderKind::OpenAi,
            None,
            "gpt-4-turbo-preview".to_string(),
            "http://127.0.0.1:1".to_string(),
        ))
    }

    #[test]
    fn test_extracts_message_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "SELECT 1;"}, "finish_reason": "stop"}]});
        assert_eq!(extract_text(&body).unwrap(), "SELECT 1;");
    }

    #[test]
    fn test_empty_choices() {
        assert!(matches!(extract_text(&json!({"choices": []})), Err(SqlGenError::EmptyResponse(_))));
        assert!(matches!(extract_text(&json!({"id": "x"})), Err(SqlGenError::EmptyResponse(_))));
    }

    #[test]
    fn test_null_content_is_malformed() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "stop"}]});
        assert!(matches!(extract_text(&body), Err(SqlGenError::MalformedResponse(_))));
    }

    #[test]
    fn test_length_truncation() {
        let partial = json!({"choices": [{"message": {"content": "SELECT u.id FROM users u JOIN"}, "finish_reason": "length"}]});
        assert_eq!(extract_text(&partial).unwrap(), "SELECT u.id FROM users u JOIN");

        let empty = json!({"choices": [{"message": {"content": "   "}, "finish_reason": "length"}]});
        assert!(matches!(extract_text(&empty), Err(SqlGenError::TruncatedEmpty(_))));
    }

    #[test]
    fn test_content_filter_is_provider_error() {
        let body = json!({"choices": [{"message": {"content": ""}, "finish_reason": "content_filter"}]});
        assert!(matches!(extract_text(&body), Err(SqlGenError::Provider(_))));
    }

    #[test]
    fn test_request_body_carries_both_messages() {
        let prompt = PromptPayload {
            system: Some("sys".to_string()),
            user: "usr".to_string(),
        };
        let body = client().request_body(&prompt);
        assert_eq!(body["model"], "gpt-4-turbo-preview");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 500);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let prompt = PromptPayload { system: None, user: "x".to_string() };
        let err = client().generate(&prompt).await.unwrap_err();
        assert!(matches!(err, SqlGenError::Configuration(_)));
    }
}
