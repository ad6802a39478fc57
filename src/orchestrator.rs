//! Generation pipeline
//!
//! Schema formatting, prompt building, the provider call and sanitization
//! run as one fallible attempt. Whatever goes wrong inside that attempt is
//! logged and replaced by the keyword fallback; only bad input and bad
//! process configuration are returned to the caller.

use crate::config::AppConfig;
use crate::error::{Result, SqlGenError};
use crate::llm::{GeminiClient, OpenAiClient, ProviderKind, SqlProvider};
use crate::mock::generate_mock_sql;
use crate::prompt::build_prompt;
use crate::sanitize::sanitize_sql;
use crate::schema::format_schema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub const FALLBACK_WARNING: &str = "Using mock mode - AI provider unavailable, returned heuristic SQL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub description: String,
    /// Provider selector, e.g. `gemini` or `openai`.
    pub provider: String,
    /// Raw schema document; `None` when the operator never configured one.
    pub schema: Option<String>,
}

impl GenerationRequest {
    pub fn from_config(description: impl Into<String>, config: &AppConfig) -> Self {
        Self {
            description: description.into(),
            provider: config.provider.clone(),
            schema: config.database_schema.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    ProviderSucceeded,
    FallbackUsed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub sql: String,
    pub outcome: GenerationOutcome,
    pub used_fallback: bool,
    pub provider: ProviderKind,
    /// Wall time in seconds, rounded to two decimals.
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Error kind that caused the fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl GenerationResult {
    /// Elapsed time as shown to clients, e.g. `"0.42s"`.
    pub fn execution_time(&self) -> String {
        format!("{:.2}s", self.elapsed_seconds)
    }
}

pub struct GenerationOrchestrator {
    config: Arc<AppConfig>,
    providers: HashMap<ProviderKind, Arc<dyn SqlProvider>>,
}

impl GenerationOrchestrator {
    pub fn new(config: AppConfig) -> Self {
        let mut providers: HashMap<ProviderKind, Arc<dyn SqlProvider>> = HashMap::new();
        providers.insert(
            ProviderKind::Gemini,
            Arc::new(GeminiClient::new(config.gemini.clone())),
        );
        providers.insert(
            ProviderKind::OpenAi,
            Arc::new(OpenAiClient::new(config.openai.clone())),
        );
        Self {
            config: Arc::new(config),
            providers,
        }
    }

    /// Replace the client registered for `provider.kind()`.
    pub fn with_provider(mut self, provider: Arc<dyn SqlProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate SQL for `description` using the configured provider and schema.
    pub async fn generate(&self, description: &str) -> Result<GenerationResult> {
        let request = GenerationRequest::from_config(description, &self.config);
        self.orchestrate(&request).await
    }

    pub async fn orchestrate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        if request.description.trim().is_empty() {
            return Err(SqlGenError::Input("Description is required".to_string()));
        }
        let schema = request
            .schema
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SqlGenError::Configuration("Database schema not configured".to_string()))?;

        let start = Instant::now();

        let kind: ProviderKind = request.provider.parse()?;
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| SqlGenError::Configuration(format!("No client registered for provider '{}'", kind)))?;

        info!(provider = %kind, "Generating SQL");

        let (sql, outcome, warning, fallback_reason) =
            match attempt(provider.as_ref(), &request.description, schema).await {
                Ok(sql) => (sql, GenerationOutcome::ProviderSucceeded, None, None),
                Err(e) => {
                    warn!(
                        provider = %kind,
                        kind = e.kind(),
                        recoverable = e.is_recoverable(),
                        error = %e,
                        "{} API unavailable, using mock mode",
                        kind.display_name()
                    );
                    (
                        generate_mock_sql(&request.description).to_string(),
                        GenerationOutcome::FallbackUsed,
                        Some(FALLBACK_WARNING.to_string()),
                        Some(e.kind().to_string()),
                    )
                }
            };

        let elapsed_seconds = round_to_hundredths(start.elapsed().as_secs_f64());
        info!(provider = %kind, ?outcome, elapsed_seconds, "SQL generation finished");

        Ok(GenerationResult {
            sql,
            outcome,
            used_fallback: outcome == GenerationOutcome::FallbackUsed,
            provider: kind,
            elapsed_seconds,
            warning,
            fallback_reason,
        })
    }
}

async fn attempt(provider: &dyn SqlProvider, description: &str, schema: &str) -> Result<String> {
    let schema_text = format_schema(schema);
    let prompt = build_prompt(description, &schema_text, provider.kind());
    let raw = provider.generate(&prompt).await?;
    let sql = sanitize_sql(&raw);
    if sql.is_empty() {
        return Err(SqlGenError::EmptyResponse(
            "provider output was empty after cleanup".to_string(),
        ));
    }
    Ok(sql)
}

fn round_to_hundredths(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
