use super::types::{BrokerOrderId, Direction, PriceObservation};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TradeStatus::Open),
            "CLOSED" => Ok(TradeStatus::Closed),
            _ => anyhow::bail!("Unknown trade status: {}", s),
        }
    }
}

/// A position opened at the broker.
///
/// Written once when the order is placed; closing is handled elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub instrument: String,
    pub direction: Direction,
    pub units: Decimal,
    /// `None` when no quote was obtainable at fill time
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub swap: Option<Decimal>,
    pub status: TradeStatus,
    pub broker_trade_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// Create a fresh OPEN trade for an order the broker accepted
    pub fn open(
        instrument: &str,
        direction: Direction,
        units: Decimal,
        entry: PriceObservation,
        broker_order: &BrokerOrderId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            instrument: instrument.to_string(),
            direction,
            units: units.abs(),
            entry_price: entry.value(),
            exit_price: None,
            profit_loss: None,
            commission: None,
            swap: None,
            status: TradeStatus::Open,
            broker_trade_id: Some(broker_order.0.clone()),
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    pub fn entry_price_or_zero(&self) -> Decimal {
        self.entry_price.unwrap_or(Decimal::ZERO)
    }
}
