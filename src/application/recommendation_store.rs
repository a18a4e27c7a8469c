use super::audit_trail::AuditTrail;
use crate::domain::audit::AuditEntity;
use crate::domain::errors::RecommendationError;
use crate::domain::recommendation::{
    AiRecommendation, LegacyRecommendation, PricedRecommendation, RecommendationListing,
    ResolvedRecommendation, StoredRecommendation, is_uuid_like,
};
use crate::domain::repositories::RecommendationRepository;
use crate::infrastructure::observability::Metrics;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: usize = 200;
pub const MAX_LIST_LIMIT: i64 = 500;

/// Non-positive or oversized limits fall back to the default page
pub fn normalize_limit(limit: i64) -> usize {
    if limit <= 0 || limit > MAX_LIST_LIMIT {
        DEFAULT_LIST_LIMIT
    } else {
        limit as usize
    }
}

/// Owns both recommendation forms: id assignment, mirroring, lookups and
/// status writes, each create/execute/delete followed by one audit row.
#[derive(Clone)]
pub struct RecommendationStore {
    ai: Arc<dyn RecommendationRepository<AiRecommendation>>,
    legacy: Arc<dyn RecommendationRepository<LegacyRecommendation>>,
    audit: AuditTrail,
    metrics: Metrics,
}

impl RecommendationStore {
    pub fn new(
        ai: Arc<dyn RecommendationRepository<AiRecommendation>>,
        legacy: Arc<dyn RecommendationRepository<LegacyRecommendation>>,
        audit: AuditTrail,
        metrics: Metrics,
    ) -> Self {
        Self {
            ai,
            legacy,
            audit,
            metrics,
        }
    }

    /// Persist the AI record (fatal on failure), then its legacy mirror (logged on failure).
    pub async fn create(
        &self,
        priced: &PricedRecommendation,
    ) -> Result<AiRecommendation, RecommendationError> {
        let id = match priced.id.as_deref() {
            Some(candidate) if is_uuid_like(candidate) => candidate.to_lowercase(),
            Some(candidate) => {
                debug!("RecommendationStore: replacing non-UUID id {:?}", candidate);
                Uuid::new_v4().to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        let record = AiRecommendation::from_priced(id, priced, Utc::now());
        self.ai
            .create(&record)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        self.audit
            .created(
                AiRecommendation::ENTITY,
                &record.id,
                json!({
                    "instrument": record.instrument,
                    "direction": record.direction,
                    "units": record.units,
                    "source": record.source.label(),
                }),
            )
            .await;
        info!(
            "RecommendationStore: created {} {} {} x{}",
            record.id, record.direction, record.instrument, record.units
        );

        self.mirror(&record).await;
        Ok(record)
    }

    async fn mirror(&self, record: &AiRecommendation) {
        let mirror = LegacyRecommendation::mirror(record);
        match self.legacy.create(&mirror).await {
            Ok(()) => {
                self.audit
                    .created(
                        LegacyRecommendation::ENTITY,
                        &mirror.id,
                        json!({ "mirror_of": record.id }),
                    )
                    .await;
            }
            Err(e) => {
                warn!(
                    "RecommendationStore: legacy mirror for {} failed: {:#}",
                    record.id, e
                );
                self.metrics.inc_best_effort_failure("mirror");
            }
        }
    }

    pub async fn list(&self, limit: i64) -> Result<RecommendationListing, RecommendationError> {
        let limit = normalize_limit(limit);
        let ai = self
            .ai
            .list_recent(limit)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        let legacy = self
            .legacy
            .list_recent(limit)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        Ok(RecommendationListing { ai, legacy })
    }

    /// Legacy PENDING records first, then AI records of any status.
    ///
    /// A record found in a non-PENDING state is reported as a conflict so
    /// the caller never submits a second order for it.
    pub async fn resolve(&self, id: &str) -> Result<ResolvedRecommendation, RecommendationError> {
        let legacy = self
            .legacy
            .find_by_id(id)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        if let Some(record) = legacy.as_ref().filter(|r| r.is_pending()) {
            return Ok(ResolvedRecommendation::Legacy(record.clone()));
        }

        let ai = self
            .ai
            .find_by_id(id)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        match (ai, legacy) {
            (Some(record), _) if record.is_pending() => Ok(ResolvedRecommendation::Ai(record)),
            (Some(_), _) | (None, Some(_)) => Err(RecommendationError::Conflict { id: id.to_string() }),
            (None, None) => Err(RecommendationError::not_found(id)),
        }
    }

    /// Compare-and-set PENDING -> EXECUTED; false means another caller got there first
    pub async fn claim(&self, resolved: &ResolvedRecommendation) -> Result<bool, RecommendationError> {
        let claimed = match resolved {
            ResolvedRecommendation::Legacy(r) => self.legacy.claim_pending(&r.id).await,
            ResolvedRecommendation::Ai(r) => self.ai.claim_pending(&r.id).await,
        };
        claimed.map_err(|e| RecommendationError::persistence(&e))
    }

    /// Return a claimed record to PENDING. Logged on failure.
    pub async fn release(&self, resolved: &ResolvedRecommendation) {
        let released = match resolved {
            ResolvedRecommendation::Legacy(r) => self.legacy.release_claim(&r.id).await,
            ResolvedRecommendation::Ai(r) => self.ai.release_claim(&r.id).await,
        };
        if let Err(e) = released {
            warn!(
                "RecommendationStore: could not release claim on {}: {:#}",
                resolved.id(),
                e
            );
            self.metrics.inc_best_effort_failure("release_claim");
        }
    }

    /// Best-effort; returns whether the status write succeeded
    pub async fn mark_executed(&self, resolved: &ResolvedRecommendation, trade_id: &str) -> bool {
        let marked = match resolved {
            ResolvedRecommendation::Legacy(r) => self.legacy.mark_executed(&r.id, trade_id).await,
            ResolvedRecommendation::Ai(r) => self.ai.mark_executed(&r.id, trade_id).await,
        };
        match marked {
            Ok(()) => {
                self.audit
                    .executed(resolved.entity(), resolved.id(), trade_id)
                    .await;
                true
            }
            Err(e) => {
                warn!(
                    "RecommendationStore: failed to mark {} executed with {}: {:#}",
                    resolved.id(),
                    trade_id,
                    e
                );
                self.metrics.inc_best_effort_failure("mark_executed");
                false
            }
        }
    }

    /// Soft delete whichever form holds the id, legacy first
    pub async fn soft_delete(&self, id: &str) -> Result<AuditEntity, RecommendationError> {
        let entity = if self
            .legacy
            .soft_delete(id)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?
        {
            LegacyRecommendation::ENTITY
        } else if self
            .ai
            .soft_delete(id)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?
        {
            AiRecommendation::ENTITY
        } else {
            return Err(RecommendationError::not_found(id));
        };

        self.audit.deleted(entity, id).await;
        info!("RecommendationStore: soft-deleted {} from {}", id, entity);
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(0), 200);
        assert_eq!(normalize_limit(-5), 200);
        assert_eq!(normalize_limit(501), 200);
        assert_eq!(normalize_limit(500), 500);
        assert_eq!(normalize_limit(25), 25);
    }
}
