use crate::domain::context::TradingContext;
use crate::domain::trading::types::{Direction, PriceObservation};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit count a draft carries when neither the model nor the caller sized it
pub const DEFAULT_DRAFT_UNITS: Decimal = dec!(100);

/// Confidence assigned to heuristic drafts
pub const HEURISTIC_CONFIDENCE: f64 = 0.5;

/// Raw answer from a recommendation model, before any normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub instrument: String,
    pub direction: Direction,
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub units: Option<Decimal>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Where a draft came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftSource {
    ModelDerived { model: String },
    Heuristic { reason: String },
}

impl DraftSource {
    pub fn label(&self) -> &'static str {
        match self {
            DraftSource::ModelDerived { .. } => "model",
            DraftSource::Heuristic { .. } => "heuristic",
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, DraftSource::Heuristic { .. })
    }
}

impl fmt::Display for DraftSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftSource::ModelDerived { model } => write!(f, "model:{}", model),
            DraftSource::Heuristic { reason } => write!(f, "heuristic ({})", reason),
        }
    }
}

/// A proposal with no price-derived fields yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecommendation {
    pub id: Option<String>,
    pub instrument: String,
    pub direction: Direction,
    pub confidence: f64,
    pub rationale: String,
    pub units: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: DraftSource,
    pub context: TradingContext,
}

/// How the final unit count was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingBasis {
    Explicit,
    RiskBased,
    DraftDefault,
}

/// Draft enriched with bracket levels, size and expiry, ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecommendation {
    /// Caller/model supplied id; the store replaces it when not UUID-shaped
    pub id: Option<String>,
    pub instrument: String,
    pub direction: Direction,
    pub units: Decimal,
    pub confidence: f64,
    pub rationale: String,
    pub entry_price: PriceObservation,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub sizing: SizingBasis,
    pub expires_at: DateTime<Utc>,
    pub source: DraftSource,
    pub context: TradingContext,
}

impl PricedRecommendation {
    pub fn has_bracket(&self) -> bool {
        self.stop_loss.is_some() || self.take_profit.is_some()
    }
}
