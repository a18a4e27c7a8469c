use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Execute,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Execute => "EXECUTE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(AuditAction::Create),
            "UPDATE" => Ok(AuditAction::Update),
            "EXECUTE" => Ok(AuditAction::Execute),
            "DELETE" => Ok(AuditAction::Delete),
            _ => anyhow::bail!("Unknown audit action: {}", s),
        }
    }
}

/// Entity names as they appear in the audit log (table names)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEntity {
    #[serde(rename = "ai_recommendations")]
    AiRecommendation,
    #[serde(rename = "recommendations")]
    Recommendation,
    #[serde(rename = "trades")]
    Trade,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::AiRecommendation => "ai_recommendations",
            AuditEntity::Recommendation => "recommendations",
            AuditEntity::Trade => "trades",
        }
    }
}

impl fmt::Display for AuditEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditEntity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai_recommendations" => Ok(AuditEntity::AiRecommendation),
            "recommendations" => Ok(AuditEntity::Recommendation),
            "trades" => Ok(AuditEntity::Trade),
            _ => anyhow::bail!("Unknown audit entity: {}", s),
        }
    }
}

/// Append-only audit row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity: AuditEntity,
    pub entity_id: String,
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        entity: AuditEntity,
        entity_id: impl Into<String>,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Self {
        Self {
            entity,
            entity_id: entity_id.into(),
            action,
            details,
            created_at: Utc::now(),
        }
    }
}
