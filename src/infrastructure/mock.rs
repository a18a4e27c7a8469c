use crate::domain::context::{
    Candle, HistoricalNotes, InstrumentMarket, MarketSnapshot, NewsItem, TradingContext,
};
use crate::domain::ports::{
    BrokerService, HistoricalDataProvider, MarketDataProvider, NewsProvider, RecommendationModel,
};
use crate::domain::recommendation::{ModelDraft, RecommendationRequest};
use crate::domain::trading::types::{BrokerOrderId, MarketOrder, Quote, currencies, pip_size};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, DurationRound, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::info;

fn default_quotes() -> HashMap<String, Quote> {
    HashMap::from([
        ("EUR_USD".to_string(), Quote::new(dec!(1.0999), dec!(1.1001))),
        ("GBP_USD".to_string(), Quote::new(dec!(1.2698), dec!(1.2702))),
        ("USD_JPY".to_string(), Quote::new(dec!(149.99), dec!(150.01))),
    ])
}

/// Deterministic broker: settable quotes and equity, optional rejection,
/// every accepted order recorded.
#[derive(Clone)]
pub struct MockBroker {
    quotes: Arc<RwLock<HashMap<String, Quote>>>,
    equity: Arc<RwLock<Decimal>>,
    rejection: Arc<RwLock<Option<String>>>,
    prices_down: Arc<AtomicBool>,
    submit_delay: Arc<RwLock<Option<std::time::Duration>>>,
    submissions: Arc<RwLock<Vec<MarketOrder>>>,
    next_order_id: Arc<AtomicU64>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            quotes: Arc::new(RwLock::new(default_quotes())),
            equity: Arc::new(RwLock::new(dec!(10000))),
            rejection: Arc::new(RwLock::new(None)),
            prices_down: Arc::new(AtomicBool::new(false)),
            submit_delay: Arc::new(RwLock::new(None)),
            submissions: Arc::new(RwLock::new(Vec::new())),
            next_order_id: Arc::new(AtomicU64::new(1000)),
        }
    }

    pub async fn set_quote(&self, instrument: &str, bid: Decimal, ask: Decimal) {
        self.quotes
            .write()
            .await
            .insert(instrument.to_string(), Quote::new(bid, ask));
    }

    pub async fn set_equity(&self, equity: Decimal) {
        *self.equity.write().await = equity;
    }

    /// Reject every order with `reason` until cleared with `None`
    pub async fn set_rejection(&self, reason: Option<&str>) {
        *self.rejection.write().await = reason.map(str::to_string);
    }

    pub fn set_prices_unavailable(&self, down: bool) {
        self.prices_down.store(down, Ordering::SeqCst);
    }

    pub async fn set_submit_delay(&self, delay: Option<std::time::Duration>) {
        *self.submit_delay.write().await = delay;
    }

    /// Configured quote, ignoring the pricing outage switch
    pub async fn quoted(&self, instrument: &str) -> Option<Quote> {
        self.quotes.read().await.get(instrument).copied()
    }

    pub async fn submissions(&self) -> Vec<MarketOrder> {
        self.submissions.read().await.clone()
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerService for MockBroker {
    async fn current_price(&self, instrument: &str) -> Result<Quote> {
        if self.prices_down.load(Ordering::SeqCst) {
            bail!("pricing unavailable for {}", instrument);
        }
        match self.quotes.read().await.get(instrument) {
            Some(quote) => Ok(*quote),
            None => bail!("no price for {}", instrument),
        }
    }

    async fn account_equity(&self) -> Result<Decimal> {
        Ok(*self.equity.read().await)
    }

    async fn submit_market_order(&self, order: &MarketOrder) -> Result<BrokerOrderId> {
        let delay = *self.submit_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.rejection.read().await.clone() {
            bail!("order failed status 400: {}", reason);
        }

        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        self.submissions.write().await.push(order.clone());
        info!(
            "MockBroker: filled {} {} x{} as #{}",
            order.direction, order.instrument, order.units, id
        );
        Ok(BrokerOrderId(id.to_string()))
    }
}

/// Synthetic M5/D candles drifting gently toward the mock quotes
#[derive(Clone, Default)]
pub struct MockMarketDataService {
    broker: MockBroker,
}

impl MockMarketDataService {
    pub fn new(broker: MockBroker) -> Self {
        Self { broker }
    }

    fn candles(instrument: &str, price: Decimal, count: i64, step: Duration) -> Vec<Candle> {
        let pip = pip_size(instrument);
        let now = Utc::now().duration_trunc(step).unwrap_or_else(|_| Utc::now());
        (0..count)
            .map(|i| {
                let back = count - 1 - i;
                let close = price - pip * Decimal::from(back);
                Candle {
                    time: now - step * back as i32,
                    open: close - pip,
                    high: close + pip,
                    low: close - pip * dec!(2),
                    close,
                    volume: 100 + i,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataService {
    async fn fetch_market(&self, instruments: &[String]) -> Result<MarketSnapshot> {
        let mut snapshot = MarketSnapshot::default();
        for instrument in instruments {
            let quote = self.broker.quoted(instrument).await;
            let candles = quote
                .and_then(|q| q.mid())
                .map(|mid| Self::candles(instrument, mid, 50, Duration::minutes(5)))
                .unwrap_or_default();
            snapshot.instruments.insert(
                instrument.clone(),
                InstrumentMarket {
                    quote,
                    granularity: Some("M5".to_string()),
                    candles,
                },
            );
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl HistoricalDataProvider for MockMarketDataService {
    async fn fetch_historical(&self, instruments: &[String]) -> Result<HistoricalNotes> {
        let mut notes = Vec::new();
        for instrument in instruments {
            if let Some(mid) = self.broker.quoted(instrument).await.and_then(|q| q.mid())
            {
                let daily = Self::candles(instrument, mid, 30, Duration::days(1));
                notes.push(super::oanda::summarize_daily(instrument, &daily));
            }
        }
        Ok(HistoricalNotes {
            notes: notes.join("\n"),
        })
    }
}

#[derive(Clone, Default)]
pub struct MockNewsProvider;

#[async_trait]
impl NewsProvider for MockNewsProvider {
    async fn fetch_news(&self, instruments: &[String]) -> Result<Vec<NewsItem>> {
        let published = Utc::now().to_rfc3339();
        Ok(instruments
            .iter()
            .flat_map(|i| currencies(i))
            .map(|ccy| NewsItem {
                title: format!("{} steady ahead of central bank remarks", ccy),
                url: format!("https://news.example.com/{}", ccy.to_lowercase()),
                snippet: format!("Traders await guidance on {} rates.", ccy),
                source: "mock-wire".to_string(),
                published: published.clone(),
            })
            .collect())
    }
}

/// Model that always answers with the same draft, or always fails
#[derive(Clone)]
pub struct MockRecommendationModel {
    reply: Option<ModelDraft>,
}

impl MockRecommendationModel {
    pub fn answering(reply: ModelDraft) -> Self {
        Self { reply: Some(reply) }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl RecommendationModel for MockRecommendationModel {
    fn name(&self) -> &str {
        "mock-model"
    }

    async fn draft(
        &self,
        _context: &TradingContext,
        _request: &RecommendationRequest,
    ) -> Result<ModelDraft> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => bail!("mock model is offline"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::types::Direction;

    #[tokio::test]
    async fn test_mock_broker_rejection_records_nothing() {
        let broker = MockBroker::new();
        broker.set_rejection(Some("INSUFFICIENT_MARGIN")).await;

        let order = MarketOrder::plain("EUR_USD", Direction::Buy, dec!(100));
        let err = broker.submit_market_order(&order).await.unwrap_err();
        assert!(err.to_string().contains("INSUFFICIENT_MARGIN"));
        assert!(broker.submissions().await.is_empty());

        broker.set_rejection(None).await;
        let id = broker.submit_market_order(&order).await.unwrap();
        assert_eq!(id.0, "1000");
    }

    #[tokio::test]
    async fn test_mock_market_snapshot_ends_at_quote_mid() {
        let broker = MockBroker::new();
        let market = MockMarketDataService::new(broker);

        let snapshot = market.fetch_market(&["EUR_USD".to_string()]).await.unwrap();
        let eur = snapshot.get("EUR_USD").unwrap();
        assert_eq!(eur.candles.len(), 50);
        assert_eq!(eur.last_close(), Some(dec!(1.1000)));
    }

    #[tokio::test]
    async fn test_pricing_outage_leaves_market_feed_up() {
        let broker = MockBroker::new();
        broker.set_prices_unavailable(true);
        let market = MockMarketDataService::new(broker.clone());

        assert!(broker.current_price("EUR_USD").await.is_err());
        let snapshot = market.fetch_market(&["EUR_USD".to_string()]).await.unwrap();
        assert_eq!(snapshot.reference_price("EUR_USD"), Some(dec!(1.1000)));
    }
}
