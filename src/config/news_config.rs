use anyhow::{Context, Result};
use std::env;

/// Brave news search configuration
#[derive(Debug, Clone, Default)]
pub struct BraveConfig {
    pub api_key: String,
    pub base_url: String,
    pub news_count: u32,
}

impl BraveConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("BRAVE_API_KEY").unwrap_or_default(),
            base_url: env::var("BRAVE_BASE_URL")
                .unwrap_or_else(|_| "https://api.search.brave.com".to_string()),
            news_count: env::var("BRAVE_NEWS_COUNT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Failed to parse BRAVE_NEWS_COUNT")?,
        })
    }
}
