//! Google Gemini `generateContent` client (primary provider).

use super::{accept_truncated, describe, ProviderKind, SqlProvider, TEMPERATURE};
use crate::config::ProviderSettings;
use crate::error::{Result, SqlGenError};
use crate::prompt::PromptPayload;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

pub const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Clone)]
pub struct GeminiClient {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    fn request_body(prompt: &PromptPayload) -> Value {
        // Gemini takes a single turn; fold any system text into it.
        let text = match &prompt.system {
            Some(system) => format!("{}\n\n{}", system, prompt.user),
            None => prompt.user.clone(),
        };
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": text }]
            }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            }
        })
    }

    async fn call(&self, prompt: &PromptPayload) -> Result<String> {
        let api_key = self.settings.credential()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| SqlGenError::Provider(format!("Gemini API call failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SqlGenError::Provider(format!("Gemini API error ({}): {}", status, error_text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SqlGenError::MalformedResponse(format!("Gemini response is not JSON: {}", e)))?;

        extract_text(&body)
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
pub fn extract_text(body: &Value) -> Result<String> {
    if let Some(error) = body.get("error") {
        return Err(SqlGenError::Provider(format!("Gemini API error: {}", describe(error))));
    }

    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| {
            SqlGenError::EmptyResponse(format!("Gemini returned no candidates: {}", describe(body)))
        })?;

    let text = candidate
        .pointer("/content/parts/0/text")
        .and_then(|t| t.as_str());

    if candidate.get("finishReason").and_then(|r| r.as_str()) == Some("MAX_TOKENS") {
        return accept_truncated(ProviderKind::Gemini, text);
    }

    text.map(str::to_string).ok_or_else(|| {
        SqlGenError::MalformedResponse(format!(
            "Invalid Gemini response structure: {}",
            describe(candidate)
        ))
    })
}

#[async_trait]
impl SqlProvider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(&self, prompt: &PromptPayload) -> Result<String> {
        match self.call(prompt).await {
            Ok(text) => {
                info!(provider = "gemini", model = %self.settings.model, chars = text.len(), "Gemini returned SQL");
                Ok(text)
            }
            Err(e) => {
                warn!(provider = "gemini", kind = e.kind(), error = %e, "Gemini generation failed");
                Err(e)
            }
        }
    }
}
