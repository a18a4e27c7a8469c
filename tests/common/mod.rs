#![allow(dead_code)]

use chrono::Utc;
use fxdesk::application::audit_trail::AuditTrail;
use fxdesk::application::context_aggregator::ContextAggregator;
use fxdesk::application::drafter::RecommendationDrafter;
use fxdesk::application::execution_engine::ExecutionEngine;
use fxdesk::application::recommendation_service::RecommendationService;
use fxdesk::application::recommendation_store::RecommendationStore;
use fxdesk::domain::audit::{AuditAction, AuditEntity};
use fxdesk::domain::ports::RecommendationModel;
use fxdesk::domain::recommendation::{
    AiRecommendation, LegacyRecommendation, LegacyStatus, RecommendationRequest,
};
use fxdesk::domain::trading::types::Direction;
use fxdesk::infrastructure::mock::{MockBroker, MockMarketDataService, MockNewsProvider};
use fxdesk::infrastructure::observability::Metrics;
use fxdesk::infrastructure::repositories::{
    InMemoryAuditRepository, InMemoryRecommendationRepository, InMemoryTradeRepository,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Engine wired to the mock broker and in-memory stores, with handles kept
/// for inspection.
pub struct Harness {
    pub broker: MockBroker,
    pub ai: Arc<InMemoryRecommendationRepository<AiRecommendation>>,
    pub legacy: Arc<InMemoryRecommendationRepository<LegacyRecommendation>>,
    pub trades: Arc<InMemoryTradeRepository>,
    pub audit: Arc<InMemoryAuditRepository>,
    pub metrics: Metrics,
    pub service: RecommendationService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_model(None)
    }

    pub fn with_model(model: Option<Arc<dyn RecommendationModel>>) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let broker = MockBroker::new();
        let ai = Arc::new(InMemoryRecommendationRepository::<AiRecommendation>::new());
        let legacy = Arc::new(InMemoryRecommendationRepository::<LegacyRecommendation>::new());
        let trades = Arc::new(InMemoryTradeRepository::new());
        let audit = Arc::new(InMemoryAuditRepository::new());
        let metrics = Metrics::new().unwrap();

        let trail = AuditTrail::new(audit.clone(), metrics.clone());
        let store = RecommendationStore::new(
            ai.clone(),
            legacy.clone(),
            trail.clone(),
            metrics.clone(),
        );
        let engine = ExecutionEngine::new(
            Arc::new(broker.clone()),
            store.clone(),
            trades.clone(),
            trail.clone(),
            metrics.clone(),
        );
        let market = Arc::new(MockMarketDataService::new(broker.clone()));
        let service = RecommendationService::new(
            ContextAggregator::new(market.clone(), Arc::new(MockNewsProvider), market),
            RecommendationDrafter::new(model),
            Arc::new(broker.clone()),
            store,
            engine,
            trades.clone(),
            trail,
            metrics.clone(),
        );

        Self {
            broker,
            ai,
            legacy,
            trades,
            audit,
            metrics,
            service,
        }
    }

    /// Generate a heuristic EUR_USD recommendation and return its AI id
    pub async fn generate_eur_usd(&self) -> String {
        let request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
        self.service.generate(request).await.unwrap().id.unwrap()
    }

    pub async fn ai_record(&self, id: &str) -> AiRecommendation {
        self.ai
            .snapshot()
            .await
            .into_iter()
            .find(|r| r.id == id)
            .unwrap()
    }

    pub async fn legacy_record(&self, id: &str) -> LegacyRecommendation {
        self.legacy
            .snapshot()
            .await
            .into_iter()
            .find(|r| r.id == id)
            .unwrap()
    }

    /// Legacy mirror written for an AI record
    pub async fn mirror_of(&self, ai_id: &str) -> LegacyRecommendation {
        self.legacy
            .snapshot()
            .await
            .into_iter()
            .find(|r| r.mirror_of.as_deref() == Some(ai_id))
            .unwrap()
    }

    pub async fn audit_actions(&self, entity: AuditEntity, id: &str) -> Vec<AuditAction> {
        self.audit
            .all()
            .await
            .into_iter()
            .filter(|e| e.entity == entity && e.entity_id == id)
            .map(|e| e.action)
            .collect()
    }

    pub async fn count_actions(&self, action: AuditAction) -> usize {
        self.audit
            .all()
            .await
            .iter()
            .filter(|e| e.action == action)
            .count()
    }
}

pub fn pending_legacy(
    id: &str,
    instrument: &str,
    direction: Direction,
    units: Decimal,
) -> LegacyRecommendation {
    LegacyRecommendation {
        id: id.to_string(),
        instrument: instrument.to_string(),
        direction,
        units,
        rationale: Some("seeded".to_string()),
        confidence: None,
        market_conditions: serde_json::Value::Null,
        status: LegacyStatus::Pending,
        trade_id: None,
        mirror_of: None,
        created_at: Utc::now(),
        executed_at: None,
        deleted_at: None,
    }
}
