use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pip size for pairs quoted in JPY
pub const JPY_PIP: Decimal = dec!(0.01);
/// Pip size for every other pair
pub const STANDARD_PIP: Decimal = dec!(0.0001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Sign applied to unit counts when talking to the broker (SELL is negative)
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Buy => Decimal::ONE,
            Direction::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn from_signed_units(units: Decimal) -> Self {
        if units.is_sign_negative() {
            Direction::Sell
        } else {
            Direction::Buy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "LONG" => Ok(Direction::Buy),
            "SELL" | "SHORT" => Ok(Direction::Sell),
            _ => anyhow::bail!("Invalid direction: {}. Must be 'BUY' or 'SELL'", s),
        }
    }
}

/// Quote currency of an instrument symbol.
///
/// Accepts OANDA style (`USD_JPY`), slash style (`USD/JPY`) and compact
/// six-letter symbols (`USDJPY`).
pub fn quote_currency(instrument: &str) -> Option<String> {
    let symbol = instrument.trim();
    if let Some((_, quote)) = symbol.rsplit_once(['_', '/']) {
        return (!quote.is_empty()).then(|| quote.to_uppercase());
    }
    if symbol.len() == 6 && symbol.is_ascii() {
        return Some(symbol[3..].to_uppercase());
    }
    None
}

/// Pip unit derived from the instrument naming convention, not a live lookup.
pub fn pip_size(instrument: &str) -> Decimal {
    match quote_currency(instrument).as_deref() {
        Some("JPY") => JPY_PIP,
        _ => STANDARD_PIP,
    }
}

/// Base and quote currencies for a symbol, used to phrase news queries
pub fn currencies(instrument: &str) -> Vec<String> {
    let symbol = instrument.trim();
    if let Some((base, quote)) = symbol.split_once(['_', '/']) {
        return vec![base.to_uppercase(), quote.to_uppercase()];
    }
    if symbol.len() == 6 && symbol.is_ascii() {
        return vec![symbol[..3].to_uppercase(), symbol[3..].to_uppercase()];
    }
    vec![symbol.to_uppercase()]
}

/// Best bid/ask for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Quote {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }

    /// Mid price, only when both sides are positive
    pub fn mid(&self) -> Option<Decimal> {
        if self.bid > Decimal::ZERO && self.ask > Decimal::ZERO {
            Some((self.bid + self.ask) / dec!(2))
        } else {
            None
        }
    }
}

/// A price that may or may not have been obtainable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PriceObservation {
    Known(Decimal),
    Unknown,
}

impl PriceObservation {
    pub fn from_quote(quote: &Quote) -> Self {
        quote.mid().map_or(PriceObservation::Unknown, PriceObservation::Known)
    }

    pub fn from_option(price: Option<Decimal>) -> Self {
        match price {
            Some(p) if p > Decimal::ZERO => PriceObservation::Known(p),
            _ => PriceObservation::Unknown,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            PriceObservation::Known(p) => Some(*p),
            PriceObservation::Unknown => None,
        }
    }

    pub fn or_zero(&self) -> Decimal {
        self.value().unwrap_or(Decimal::ZERO)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, PriceObservation::Known(_))
    }
}

/// Identifier assigned by the broker to an accepted order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokerOrderId(pub String);

impl fmt::Display for BrokerOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Market order, optionally bracketed with stop-loss/take-profit triggers.
///
/// `units` is a positive magnitude; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub instrument: String,
    pub direction: Direction,
    pub units: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl MarketOrder {
    pub fn plain(instrument: &str, direction: Direction, units: Decimal) -> Self {
        Self {
            instrument: instrument.to_string(),
            direction,
            units: units.abs(),
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn with_bracket(mut self, stop_loss: Option<Decimal>, take_profit: Option<Decimal>) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    pub fn is_bracketed(&self) -> bool {
        self.stop_loss.is_some() || self.take_profit.is_some()
    }

    pub fn signed_units(&self) -> Decimal {
        self.units.abs() * self.direction.sign()
    }

    pub fn kind(&self) -> &'static str {
        if self.is_bracketed() { "bracket" } else { "market" }
    }
}
