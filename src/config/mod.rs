//! Configuration module for fxdesk.
//!
//! Structured configuration loaded from environment variables (the binary
//! calls `dotenvy::dotenv()` first), organized by collaborator: broker,
//! news, model, HTTP and persistence.

mod broker_config;
mod http_config;
mod model_config;
mod news_config;

pub use broker_config::OandaConfig;
pub use http_config::HttpConfig;
pub use model_config::AnthropicConfig;
pub use news_config::BraveConfig;

use anyhow::Result;
use std::env;
use std::str::FromStr;

/// Which adapters back the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mock,
    Oanda,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "oanda" => Ok(Mode::Oanda),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock' or 'oanda'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub database_url: String,
}

impl PersistenceConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://fxdesk.db".to_string()),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub oanda: OandaConfig,
    pub brave: BraveConfig,
    pub anthropic: AnthropicConfig,
    pub http: HttpConfig,
    pub persistence: PersistenceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode = env::var("MODE")
            .unwrap_or_else(|_| "mock".to_string())
            .parse::<Mode>()?;

        let oanda = OandaConfig::from_env();
        if mode == Mode::Oanda && !oanda.is_configured() {
            anyhow::bail!("MODE=oanda requires OANDA_API_KEY and OANDA_ACCOUNT_ID");
        }

        Ok(Self {
            mode,
            oanda,
            brave: BraveConfig::from_env()?,
            anthropic: AnthropicConfig::from_env()?,
            http: HttpConfig::from_env()?,
            persistence: PersistenceConfig::from_env(),
        })
    }
}
