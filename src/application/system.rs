use anyhow::Result;
use tracing::info;

use crate::application::audit_trail::AuditTrail;
use crate::application::bootstrap::{PersistenceBootstrap, PersistenceHandle, ServicesBootstrap};
use crate::application::context_aggregator::ContextAggregator;
use crate::application::drafter::RecommendationDrafter;
use crate::application::execution_engine::ExecutionEngine;
use crate::application::recommendation_service::RecommendationService;
use crate::application::recommendation_store::RecommendationStore;
use crate::config::Config;
use crate::infrastructure::observability::Metrics;

/// Fully wired engine for one process
pub struct Application {
    pub config: Config,
    pub persistence: PersistenceHandle,
    pub service: RecommendationService,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building fxdesk Application (Mode: {:?})...", config.mode);

        let persistence = PersistenceBootstrap::init(&config.persistence).await?;
        let services = ServicesBootstrap::init(&config, &persistence)?;
        let metrics = Metrics::new()?;

        let audit = AuditTrail::new(persistence.audit_repository.clone(), metrics.clone());
        let store = RecommendationStore::new(
            persistence.ai_repository.clone(),
            persistence.legacy_repository.clone(),
            audit.clone(),
            metrics.clone(),
        );
        let engine = ExecutionEngine::new(
            services.broker.clone(),
            store.clone(),
            persistence.trade_repository.clone(),
            audit.clone(),
            metrics.clone(),
        );
        let service = RecommendationService::new(
            ContextAggregator::new(services.market, services.news, services.historical),
            RecommendationDrafter::new(services.model),
            services.broker,
            store,
            engine,
            persistence.trade_repository.clone(),
            audit,
            metrics,
        );

        info!("Application ready.");
        Ok(Self {
            config,
            persistence,
            service,
        })
    }
}
