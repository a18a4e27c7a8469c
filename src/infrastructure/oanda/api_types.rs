//! OANDA v3 JSON structures

use crate::domain::context::Candle;
use crate::domain::trading::types::Quote;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct OandaPriceBucket {
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct OandaPricingResponse {
    pub prices: Vec<OandaPriceItem>,
}

#[derive(Debug, Deserialize)]
pub struct OandaPriceItem {
    pub instrument: String,
    #[serde(default)]
    pub bids: Vec<OandaPriceBucket>,
    #[serde(default)]
    pub asks: Vec<OandaPriceBucket>,
}

impl OandaPriceItem {
    /// Top-of-book bid/ask; `None` if either side is empty or unparseable
    pub fn best_quote(&self) -> Option<Quote> {
        let bid = self.bids.first()?.price.parse::<Decimal>().ok()?;
        let ask = self.asks.first()?.price.parse::<Decimal>().ok()?;
        Some(Quote::new(bid, ask))
    }
}

#[derive(Debug, Deserialize)]
pub struct OandaCandlesResponse {
    #[serde(default)]
    pub granularity: Option<String>,
    pub candles: Vec<OandaCandle>,
}

#[derive(Debug, Deserialize)]
pub struct OandaCandle {
    pub complete: bool,
    pub volume: i64,
    pub time: String,
    pub mid: Option<OandaCandleOhlc>,
}

#[derive(Debug, Deserialize)]
pub struct OandaCandleOhlc {
    pub o: String,
    pub h: String,
    pub l: String,
    pub c: String,
}

impl OandaCandle {
    pub fn to_candle(&self) -> Option<Candle> {
        let mid = self.mid.as_ref()?;
        let time = DateTime::parse_from_rfc3339(&self.time)
            .ok()?
            .with_timezone(&Utc);
        Some(Candle {
            time,
            open: mid.o.parse().ok()?,
            high: mid.h.parse().ok()?,
            low: mid.l.parse().ok()?,
            close: mid.c.parse().ok()?,
            volume: self.volume,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OandaAccountSummaryResponse {
    pub account: OandaAccountSummary,
}

#[derive(Debug, Deserialize)]
pub struct OandaAccountSummary {
    pub balance: String,
    #[serde(rename = "NAV")]
    pub nav: String,
}

#[derive(Debug, Serialize)]
pub struct OandaOrderRequestWrapper {
    pub order: OandaOrderRequest,
}

#[derive(Debug, Serialize)]
pub struct OandaOrderRequest {
    pub units: String,
    pub instrument: String,
    #[serde(rename = "timeInForce")]
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(rename = "positionFill")]
    pub position_fill: String,
    #[serde(rename = "stopLossOnFill", skip_serializing_if = "Option::is_none")]
    pub stop_loss_on_fill: Option<OandaPriceDetails>,
    #[serde(rename = "takeProfitOnFill", skip_serializing_if = "Option::is_none")]
    pub take_profit_on_fill: Option<OandaPriceDetails>,
}

#[derive(Debug, Serialize)]
pub struct OandaPriceDetails {
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct OandaOrderCreateResponse {
    #[serde(rename = "orderCreateTransaction")]
    pub order_create_transaction: OandaTransaction,
    #[serde(rename = "orderCancelTransaction", default)]
    pub order_cancel_transaction: Option<OandaCancelTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct OandaTransaction {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct OandaCancelTransaction {
    #[serde(default)]
    pub reason: Option<String>,
}
