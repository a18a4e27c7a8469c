//! Thin OANDA v3 REST client shared by the broker and market data adapters.

use super::api_types::{
    OandaAccountSummaryResponse, OandaCandlesResponse, OandaOrderCreateResponse,
    OandaOrderRequestWrapper, OandaPricingResponse,
};
use crate::config::{HttpConfig, OandaConfig};
use crate::infrastructure::core::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Clone)]
pub struct OandaClient {
    config: OandaConfig,
    /// Retrying client, GETs only
    reads: ClientWithMiddleware,
    /// Order submission; never retried
    writes: Client,
}

impl OandaClient {
    pub fn new(config: OandaConfig, http: &HttpConfig) -> Self {
        Self {
            config,
            reads: HttpClientFactory::create_client(http),
            writes: HttpClientFactory::create_plain_client(http),
        }
    }

    pub fn config(&self) -> &OandaConfig {
        &self.config
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/v3/accounts/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_id,
            suffix
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("OANDA GET {}", url);
        let resp = self
            .reads
            .get(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .with_context(|| format!("OANDA request failed: {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OANDA GET failed status {}: {}", status.as_u16(), body);
        }
        resp.json::<T>()
            .await
            .context("Failed to decode OANDA response")
    }

    pub async fn pricing(&self, instruments: &[String]) -> Result<OandaPricingResponse> {
        let url = build_url_with_query(
            &self.account_url("pricing"),
            &[("instruments", instruments.join(","))],
        );
        self.get_json(&url).await
    }

    pub async fn account_summary(&self) -> Result<OandaAccountSummaryResponse> {
        self.get_json(&self.account_url("summary")).await
    }

    /// Most recent `count` mid candles
    pub async fn candles(
        &self,
        instrument: &str,
        granularity: &str,
        count: u32,
    ) -> Result<OandaCandlesResponse> {
        let base = format!(
            "{}/v3/instruments/{}/candles",
            self.config.api_base_url.trim_end_matches('/'),
            instrument
        );
        let url = build_url_with_query(
            &base,
            &[
                ("granularity", granularity.to_string()),
                ("count", count.to_string()),
                ("price", "M".to_string()),
            ],
        );
        self.get_json(&url).await
    }

    pub async fn create_order(
        &self,
        order: &OandaOrderRequestWrapper,
    ) -> Result<OandaOrderCreateResponse> {
        let url = self.account_url("orders");
        let resp = self
            .writes
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(order)
            .send()
            .await
            .context("OANDA order request failed")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("order failed status {}: {}", status.as_u16(), body);
        }
        serde_json::from_str(&body).context("Failed to decode OANDA order response")
    }
}
