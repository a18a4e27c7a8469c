use crate::domain::context::{HistoricalNotes, MarketSnapshot, NewsItem, TradingContext};
use crate::domain::recommendation::{ModelDraft, RecommendationRequest};
use crate::domain::trading::types::{BrokerOrderId, MarketOrder, Quote};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_market(&self, instruments: &[String]) -> Result<MarketSnapshot>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, instruments: &[String]) -> Result<Vec<NewsItem>>;
}

#[async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    async fn fetch_historical(&self, instruments: &[String]) -> Result<HistoricalNotes>;
}

/// Turns an assembled context into a raw draft.
///
/// Implementations may fail freely (missing credential, bad reply); the
/// drafter degrades to a heuristic draft on any error.
#[async_trait]
pub trait RecommendationModel: Send + Sync {
    fn name(&self) -> &str;

    async fn draft(
        &self,
        context: &TradingContext,
        request: &RecommendationRequest,
    ) -> Result<ModelDraft>;
}

#[async_trait]
pub trait BrokerService: Send + Sync {
    async fn current_price(&self, instrument: &str) -> Result<Quote>;

    /// Net asset value of the trading account
    async fn account_equity(&self) -> Result<Decimal>;

    /// Never retried; a returned error means no order exists
    async fn submit_market_order(&self, order: &MarketOrder) -> Result<BrokerOrderId>;
}
