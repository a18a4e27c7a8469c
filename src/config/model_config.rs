use anyhow::{Context, Result};
use std::env;

/// Anthropic Messages API configuration.
///
/// An empty `api_key` is allowed; the model then errors on every call and
/// recommendations fall back to the heuristic draft.
#[derive(Debug, Clone, Default)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl AnthropicConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-opus-4-1-20250805".to_string()),
            max_tokens: env::var("ANTHROPIC_MAX_TOKENS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("Failed to parse ANTHROPIC_MAX_TOKENS")?,
            temperature: env::var("ANTHROPIC_TEMPERATURE")
                .unwrap_or_else(|_| "0.3".to_string())
                .parse()
                .context("Failed to parse ANTHROPIC_TEMPERATURE")?,
        })
    }
}
