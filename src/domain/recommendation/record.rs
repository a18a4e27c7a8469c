use super::draft::{DraftSource, PricedRecommendation};
use crate::domain::audit::AuditEntity;
use crate::domain::trading::types::Direction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Accepts the canonical 8-4-4-4-12 hex layout only
pub fn is_uuid_like(candidate: &str) -> bool {
    Uuid::parse_str(candidate)
        .map(|parsed| parsed.hyphenated().to_string() == candidate.to_lowercase())
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AiRecommendationStatus {
    Pending,
    /// Reserved, not reachable through the engine
    Approved,
    /// Reserved, not reachable through the engine
    Rejected,
    Executed,
}

impl AiRecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Executed => "EXECUTED",
        }
    }
}

impl fmt::Display for AiRecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiRecommendationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "EXECUTED" => Ok(Self::Executed),
            _ => anyhow::bail!("Unknown recommendation status: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegacyStatus {
    Pending,
    Executed,
}

impl LegacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Executed => "EXECUTED",
        }
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "EXECUTED" => Ok(Self::Executed),
            _ => anyhow::bail!("Unknown legacy recommendation status: {}", s),
        }
    }
}

/// Rich recommendation record, source of truth for execution numerics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub id: String,
    pub instrument: String,
    pub direction: Direction,
    pub units: Decimal,
    pub confidence: f64,
    pub rationale: String,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub expires_at: DateTime<Utc>,
    pub market_context: serde_json::Value,
    pub news_context: serde_json::Value,
    pub historical_context: serde_json::Value,
    pub source: DraftSource,
    pub status: AiRecommendationStatus,
    pub executed_trade_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AiRecommendation {
    pub fn from_priced(id: String, priced: &PricedRecommendation, now: DateTime<Utc>) -> Self {
        Self {
            id,
            instrument: priced.instrument.clone(),
            direction: priced.direction,
            units: priced.units.abs(),
            confidence: priced.confidence.clamp(0.0, 1.0),
            rationale: priced.rationale.clone(),
            stop_loss: priced.stop_loss,
            take_profit: priced.take_profit,
            expires_at: priced.expires_at,
            market_context: priced.context.market_json(),
            news_context: priced.context.news_json(),
            historical_context: priced.context.historical_json(),
            source: priced.source.clone(),
            status: AiRecommendationStatus::Pending,
            executed_trade_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Lean compatibility record mirrored from an [`AiRecommendation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecommendation {
    pub id: String,
    pub instrument: String,
    pub direction: Direction,
    pub units: Decimal,
    pub rationale: Option<String>,
    pub confidence: Option<f64>,
    pub market_conditions: serde_json::Value,
    pub status: LegacyStatus,
    pub trade_id: Option<String>,
    /// Id of the AI record this row mirrors; informational only
    pub mirror_of: Option<String>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LegacyRecommendation {
    pub fn mirror(ai: &AiRecommendation) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instrument: ai.instrument.clone(),
            direction: ai.direction,
            units: ai.units,
            rationale: (!ai.rationale.is_empty()).then(|| ai.rationale.clone()),
            confidence: (ai.confidence > 0.0).then_some(ai.confidence),
            market_conditions: ai.market_context.clone(),
            status: LegacyStatus::Pending,
            trade_id: None,
            mirror_of: Some(ai.id.clone()),
            created_at: ai.created_at,
            executed_at: None,
            deleted_at: None,
        }
    }
}

/// Status operations shared by both recommendation forms, used by the
/// generic in-memory store and the execution engine.
pub trait StoredRecommendation: Clone + Send + Sync + 'static {
    const ENTITY: AuditEntity;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn is_pending(&self) -> bool;
    fn is_deleted(&self) -> bool;

    /// PENDING -> EXECUTED, without a trade reference yet
    fn claim(&mut self, at: DateTime<Utc>);
    /// Back to PENDING after a claimed order was rejected
    fn release(&mut self, at: DateTime<Utc>);
    fn mark_executed(&mut self, trade_id: &str, at: DateTime<Utc>);
    fn soft_delete(&mut self, at: DateTime<Utc>);
}

impl StoredRecommendation for AiRecommendation {
    const ENTITY: AuditEntity = AuditEntity::AiRecommendation;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_pending(&self) -> bool {
        self.status == AiRecommendationStatus::Pending
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn claim(&mut self, at: DateTime<Utc>) {
        self.status = AiRecommendationStatus::Executed;
        self.updated_at = at;
    }

    fn release(&mut self, at: DateTime<Utc>) {
        self.status = AiRecommendationStatus::Pending;
        self.executed_trade_id = None;
        self.updated_at = at;
    }

    fn mark_executed(&mut self, trade_id: &str, at: DateTime<Utc>) {
        self.status = AiRecommendationStatus::Executed;
        self.executed_trade_id = Some(trade_id.to_string());
        self.updated_at = at;
    }

    fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at;
    }
}

impl StoredRecommendation for LegacyRecommendation {
    const ENTITY: AuditEntity = AuditEntity::Recommendation;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_pending(&self) -> bool {
        self.status == LegacyStatus::Pending
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn claim(&mut self, _at: DateTime<Utc>) {
        self.status = LegacyStatus::Executed;
    }

    fn release(&mut self, _at: DateTime<Utc>) {
        self.status = LegacyStatus::Pending;
        self.trade_id = None;
        self.executed_at = None;
    }

    fn mark_executed(&mut self, trade_id: &str, at: DateTime<Utc>) {
        self.status = LegacyStatus::Executed;
        self.trade_id = Some(trade_id.to_string());
        self.executed_at = Some(at);
    }

    fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

/// Result of looking an id up across both forms
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRecommendation {
    Legacy(LegacyRecommendation),
    Ai(AiRecommendation),
}

impl ResolvedRecommendation {
    pub fn id(&self) -> &str {
        match self {
            Self::Legacy(r) => &r.id,
            Self::Ai(r) => &r.id,
        }
    }

    pub fn entity(&self) -> AuditEntity {
        match self {
            Self::Legacy(_) => LegacyRecommendation::ENTITY,
            Self::Ai(_) => AiRecommendation::ENTITY,
        }
    }

    pub fn instrument(&self) -> &str {
        match self {
            Self::Legacy(r) => &r.instrument,
            Self::Ai(r) => &r.instrument,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Legacy(r) => r.direction,
            Self::Ai(r) => r.direction,
        }
    }

    pub fn units(&self) -> Decimal {
        match self {
            Self::Legacy(r) => r.units,
            Self::Ai(r) => r.units,
        }
    }

    /// Only the AI form carries trigger prices
    pub fn bracket(&self) -> (Option<Decimal>, Option<Decimal>) {
        match self {
            Self::Legacy(_) => (None, None),
            Self::Ai(r) => (r.stop_loss, r.take_profit),
        }
    }
}

/// Both forms, listed independently
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationListing {
    pub ai: Vec<AiRecommendation>,
    pub legacy: Vec<LegacyRecommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shape_check() {
        assert!(is_uuid_like("0f8fad5b-d9cb-469f-a165-70867728950e"));
        assert!(is_uuid_like("0F8FAD5B-D9CB-469F-A165-70867728950E"));
        assert!(!is_uuid_like("rec-42"));
        assert!(!is_uuid_like("0f8fad5bd9cb469fa16570867728950e"));
        assert!(!is_uuid_like(""));
    }

    #[test]
    fn test_legacy_claim_and_release() {
        let now = Utc::now();
        let mut legacy = LegacyRecommendation {
            id: "l1".to_string(),
            instrument: "EUR_USD".to_string(),
            direction: Direction::Buy,
            units: Decimal::ONE_HUNDRED,
            rationale: None,
            confidence: None,
            market_conditions: serde_json::Value::Null,
            status: LegacyStatus::Pending,
            trade_id: None,
            mirror_of: None,
            created_at: now,
            executed_at: None,
            deleted_at: None,
        };

        legacy.claim(now);
        assert!(!legacy.is_pending());
        legacy.release(now);
        assert!(legacy.is_pending());

        legacy.mark_executed("order-9", now);
        assert_eq!(legacy.trade_id.as_deref(), Some("order-9"));
        assert_eq!(legacy.executed_at, Some(now));
    }
}
