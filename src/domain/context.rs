//! Market, news and historical snapshots assembled before drafting a
//! recommendation. Persisted as opaque JSON blobs alongside the AI record.

use crate::domain::trading::types::Quote;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMarket {
    pub quote: Option<Quote>,
    pub granularity: Option<String>,
    pub candles: Vec<Candle>,
}

impl InstrumentMarket {
    pub fn last_close(&self) -> Option<Decimal> {
        self.candles.last().map(|c| c.close)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub instruments: BTreeMap<String, InstrumentMarket>,
}

impl MarketSnapshot {
    pub fn get(&self, instrument: &str) -> Option<&InstrumentMarket> {
        self.instruments.get(instrument)
    }

    /// Latest known price from the snapshot: quote mid, else last candle close
    pub fn reference_price(&self, instrument: &str) -> Option<Decimal> {
        let market = self.get(instrument)?;
        market
            .quote
            .as_ref()
            .and_then(Quote::mid)
            .or_else(|| market.last_close())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    pub published: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalNotes {
    pub notes: String,
}

/// Everything the drafter sees, stamped when it was assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingContext {
    pub assembled_at: DateTime<Utc>,
    pub market: MarketSnapshot,
    pub news: Vec<NewsItem>,
    pub historical: HistoricalNotes,
}

impl TradingContext {
    pub fn market_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.market).unwrap_or(serde_json::Value::Null)
    }

    pub fn news_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.news).unwrap_or(serde_json::Value::Null)
    }

    pub fn historical_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.historical).unwrap_or(serde_json::Value::Null)
    }

    /// Short plain-text digest used in model prompts
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for (instrument, market) in &self.market.instruments {
            let price = self
                .market
                .reference_price(instrument)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!(
                "{}: price={} candles={}",
                instrument,
                price,
                market.candles.len()
            ));
        }
        for item in self.news.iter().take(5) {
            lines.push(format!("news: {} ({})", item.title, item.source));
        }
        if !self.historical.notes.is_empty() {
            lines.push(format!("history: {}", self.historical.notes));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(close: Decimal) -> Candle {
        Candle {
            time: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    #[test]
    fn test_reference_price_prefers_quote_mid() {
        let mut snapshot = MarketSnapshot::default();
        snapshot.instruments.insert(
            "EUR_USD".to_string(),
            InstrumentMarket {
                quote: Some(Quote::new(dec!(1.1000), dec!(1.1002))),
                granularity: Some("M5".to_string()),
                candles: vec![candle(dec!(1.0990))],
            },
        );
        snapshot.instruments.insert(
            "USD_JPY".to_string(),
            InstrumentMarket {
                quote: None,
                granularity: Some("M5".to_string()),
                candles: vec![candle(dec!(149.90)), candle(dec!(150.00))],
            },
        );

        assert_eq!(snapshot.reference_price("EUR_USD"), Some(dec!(1.1001)));
        assert_eq!(snapshot.reference_price("USD_JPY"), Some(dec!(150.00)));
        assert_eq!(snapshot.reference_price("GBP_USD"), None);
    }
}
