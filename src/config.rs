//! Process configuration
//!
//! Read once at startup from the environment (optionally seeded from `.env`)
//! and never mutated afterwards. Everything downstream receives it by value or
//! behind an `Arc`.

use crate::error::{Result, SqlGenError};
use crate::llm::ProviderKind;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Credentials and endpoint for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind, api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            kind,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The usable API key, or a configuration error when it is missing or
    /// still the value shipped in the sample `.env`.
    pub fn credential(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => Err(SqlGenError::Configuration(format!(
                "{} API key not configured",
                self.kind.display_name()
            ))),
            Some(key) if key == self.kind.placeholder_key() => Err(SqlGenError::Configuration(
                format!("{} API key not configured", self.kind.display_name()),
            )),
            Some(key) => Ok(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Raw provider selector. Resolved per request so that an unknown value
    /// is reported to the caller instead of aborting startup.
    pub provider: String,
    /// Raw schema document (JSON), as supplied by the operator.
    pub database_schema: Option<String>,
    pub gemini: ProviderSettings,
    pub openai: ProviderSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                SqlGenError::Configuration(format!("Invalid PORT '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            provider: get("AI_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            database_schema: get("DATABASE_SCHEMA"),
            gemini: ProviderSettings::new(
                ProviderKind::Gemini,
                get("GEMINI_API_KEY"),
                get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            ),
            openai: ProviderSettings::new(
                ProviderKind::OpenAi,
                get("OPENAI_API_KEY"),
                get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            server: ServerSettings {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                frontend_url: get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            },
        })
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.database_schema = Some(schema.into());
        self
    }

    pub fn with_provider(mut self, selector: impl Into<String>) -> Self {
        self.provider = selector.into();
        self
    }

    pub fn provider_settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            database_schema: None,
            gemini: ProviderSettings::new(
                ProviderKind::Gemini,
                None,
                DEFAULT_GEMINI_MODEL.to_string(),
                DEFAULT_GEMINI_BASE_URL.to_string(),
            ),
            openai: ProviderSettings::new(
                ProviderKind::OpenAi,
                None,
                DEFAULT_OPENAI_MODEL.to_string(),
                DEFAULT_OPENAI_BASE_URL.to_string(),
            ),
            server: ServerSettings::default(),
        }
    }
}
