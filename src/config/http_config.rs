use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Timeouts and retry bounds shared by every outbound HTTP client
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Retries for idempotent GETs; order submission never retries
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Failed to parse HTTP_TIMEOUT_SECS")?;
        let max_retries: u32 = env::var("HTTP_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("Failed to parse HTTP_MAX_RETRIES")?;

        if timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(timeout_secs.min(10)),
            max_retries,
        })
    }
}
