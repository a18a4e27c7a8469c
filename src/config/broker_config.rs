//! Broker configuration parsing from environment variables.

use std::env;

/// OANDA v3 REST configuration
#[derive(Debug, Clone, Default)]
pub struct OandaConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub account_id: String,
    /// Persist fetched M5 candles to the `market_data` table
    pub store_candles: bool,
}

impl OandaConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("OANDA_API_BASE_URL")
                .unwrap_or_else(|_| "https://api-fxpractice.oanda.com".to_string()),
            api_key: env::var("OANDA_API_KEY").unwrap_or_default(),
            account_id: env::var("OANDA_ACCOUNT_ID").unwrap_or_default(),
            store_candles: env::var("OANDA_STORE_CANDLES")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.account_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oanda_config_defaults() {
        let config = OandaConfig::from_env();
        assert!(config.api_base_url.contains("oanda.com"));
    }

    #[test]
    fn test_unconfigured_without_credentials() {
        let config = OandaConfig {
            api_key: "token".to_string(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
