use super::client::OandaClient;
use crate::domain::context::{Candle, HistoricalNotes, InstrumentMarket, MarketSnapshot};
use crate::domain::ports::{HistoricalDataProvider, MarketDataProvider};
use crate::domain::repositories::MarketDataRepository;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

const INTRADAY_GRANULARITY: &str = "M5";
const INTRADAY_COUNT: u32 = 50;
const DAILY_GRANULARITY: &str = "D";
const DAILY_COUNT: u32 = 30;

/// Market and historical snapshots from OANDA pricing and candles.
///
/// When a candle store is attached, fetched M5 candles are upserted into it;
/// failures there are logged and never affect the snapshot.
pub struct OandaMarketDataService {
    client: OandaClient,
    candle_store: Option<Arc<dyn MarketDataRepository>>,
}

impl OandaMarketDataService {
    pub fn new(client: OandaClient, candle_store: Option<Arc<dyn MarketDataRepository>>) -> Self {
        Self {
            client,
            candle_store,
        }
    }

    async fn candles(&self, instrument: &str, granularity: &str, count: u32) -> Result<Vec<Candle>> {
        let resp = self.client.candles(instrument, granularity, count).await?;
        Ok(resp.candles.iter().filter_map(|c| c.to_candle()).collect())
    }
}

#[async_trait]
impl MarketDataProvider for OandaMarketDataService {
    async fn fetch_market(&self, instruments: &[String]) -> Result<MarketSnapshot> {
        let pricing = self.client.pricing(instruments).await?;

        let mut snapshot = MarketSnapshot::default();
        for instrument in instruments {
            let quote = pricing
                .prices
                .iter()
                .find(|p| &p.instrument == instrument)
                .and_then(|p| p.best_quote());
            let candles = self
                .candles(instrument, INTRADAY_GRANULARITY, INTRADAY_COUNT)
                .await?;

            if let Some(store) = &self.candle_store
                && let Err(e) = store
                    .upsert_candles(instrument, INTRADAY_GRANULARITY, &candles)
                    .await
            {
                warn!("OANDA: could not persist candles for {}: {:#}", instrument, e);
            }

            debug!("OANDA: {} {} candles for {}", candles.len(), INTRADAY_GRANULARITY, instrument);
            snapshot.instruments.insert(
                instrument.clone(),
                InstrumentMarket {
                    quote,
                    granularity: Some(INTRADAY_GRANULARITY.to_string()),
                    candles,
                },
            );
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl HistoricalDataProvider for OandaMarketDataService {
    async fn fetch_historical(&self, instruments: &[String]) -> Result<HistoricalNotes> {
        let mut notes = Vec::new();
        for instrument in instruments {
            let daily = self.candles(instrument, DAILY_GRANULARITY, DAILY_COUNT).await?;
            notes.push(summarize_daily(instrument, &daily));
        }
        Ok(HistoricalNotes {
            notes: notes.join("\n"),
        })
    }
}

/// One line per instrument: range, net change and last close over the candles
pub fn summarize_daily(instrument: &str, candles: &[Candle]) -> String {
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        return format!("{}: no daily history", instrument);
    };

    let high = candles.iter().map(|c| c.high).max().unwrap_or(last.high);
    let low = candles.iter().map(|c| c.low).min().unwrap_or(last.low);
    let change = last.close - first.open;
    let change_pct = if first.open.is_zero() {
        Decimal::ZERO
    } else {
        (change / first.open * Decimal::ONE_HUNDRED).round_dp(2)
    };

    format!(
        "{}: {}d range {}-{}, net change {} ({}%), last close {}",
        instrument,
        candles.len(),
        low,
        high,
        change,
        change_pct,
        last.close
    )
}
