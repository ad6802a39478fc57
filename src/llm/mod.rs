//! LLM providers
//!
//! Every provider is one capability: turn a prompt into raw text. The
//! orchestrator picks an implementation by configuration and never looks at
//! provider-specific envelopes.

pub mod gemini;
pub mod openai;

use crate::error::{Result, SqlGenError};
use crate::prompt::PromptPayload;
use crate::sanitize::sanitize_sql;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

pub const TEMPERATURE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Primary provider.
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
        }
    }

    /// Value shipped in the sample `.env`; treated as "not configured".
    pub fn placeholder_key(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "your_gemini_api_key_here",
            ProviderKind::OpenAi => "your_openai_api_key_here",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SqlGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(SqlGenError::Configuration(format!(
                "Invalid AI provider '{}' (expected 'gemini' or 'openai')",
                other
            ))),
        }
    }
}

#[async_trait]
pub trait SqlProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// One request, no retry. Returns the provider's text unmodified.
    async fn generate(&self, prompt: &PromptPayload) -> Result<String>;
}

/// Shared handling for a candidate cut off by the output token limit: keep it
/// if anything usable survives sanitization.
pub(crate) fn accept_truncated(kind: ProviderKind, text: Option<&str>) -> Result<String> {
    match text {
        Some(t) if !sanitize_sql(t).is_empty() => {
            tracing::warn!(
                provider = %kind,
                "{} hit the output token limit, response may be incomplete",
                kind.display_name()
            );
            Ok(t.to_string())
        }
        _ => Err(SqlGenError::TruncatedEmpty(format!(
            "{} exceeded token limit with no usable output",
            kind.display_name()
        ))),
    }
}

/// Render a JSON value for diagnostics without failing.
pub(crate) fn describe(value: &serde_json::Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "Could not serialize".to_string())
}
