use crate::domain::audit::{AuditAction, AuditEntity, AuditEntry};
use crate::domain::repositories::AuditRepository;
use crate::infrastructure::observability::Metrics;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Best-effort writer in front of the audit repository.
///
/// A failed append is logged and counted; it never fails the operation
/// being documented.
#[derive(Clone)]
pub struct AuditTrail {
    repository: Arc<dyn AuditRepository>,
    metrics: Metrics,
}

impl AuditTrail {
    pub fn new(repository: Arc<dyn AuditRepository>, metrics: Metrics) -> Self {
        Self {
            repository,
            metrics,
        }
    }

    /// Returns whether the row was written
    pub async fn record(
        &self,
        entity: AuditEntity,
        entity_id: &str,
        action: AuditAction,
        details: Value,
    ) -> bool {
        let entry = AuditEntry::new(entity, entity_id, action, details);
        match self.repository.append(&entry).await {
            Ok(()) => {
                debug!("Audit: {} {} {}", action, entity, entity_id);
                true
            }
            Err(e) => {
                warn!(
                    "Audit: failed to record {} for {} {}: {:#}",
                    action, entity, entity_id, e
                );
                self.metrics.inc_best_effort_failure("audit");
                false
            }
        }
    }

    pub async fn created(&self, entity: AuditEntity, entity_id: &str, details: Value) -> bool {
        self.record(entity, entity_id, AuditAction::Create, details)
            .await
    }

    pub async fn executed(&self, entity: AuditEntity, entity_id: &str, trade_id: &str) -> bool {
        self.record(
            entity,
            entity_id,
            AuditAction::Execute,
            serde_json::json!({ "trade_id": trade_id }),
        )
        .await
    }

    pub async fn deleted(&self, entity: AuditEntity, entity_id: &str) -> bool {
        self.record(entity, entity_id, AuditAction::Delete, Value::Null)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryAuditRepository;

    #[tokio::test]
    async fn test_failed_append_is_swallowed_and_counted() {
        let repo = Arc::new(InMemoryAuditRepository::new());
        let metrics = Metrics::new().unwrap();
        let trail = AuditTrail::new(repo.clone(), metrics.clone());

        assert!(trail.deleted(AuditEntity::Trade, "t-1").await);

        repo.set_failing(true);
        assert!(!trail.executed(AuditEntity::AiRecommendation, "r-1", "o-1").await);
        assert_eq!(metrics.best_effort_failures("audit"), 1.0);

        repo.set_failing(false);
        let entries = repo.list_for(AuditEntity::Trade, "t-1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Delete);
    }
}
