use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::PersistenceConfig;
use crate::domain::recommendation::{AiRecommendation, LegacyRecommendation};
use crate::domain::repositories::{
    AuditRepository, MarketDataRepository, RecommendationRepository, TradeRepository,
};
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::{
    SqliteAiRecommendationRepository, SqliteAuditRepository, SqliteLegacyRecommendationRepository,
    SqliteMarketDataRepository, SqliteTradeRepository,
};
use crate::infrastructure::repositories::{
    InMemoryAuditRepository, InMemoryMarketDataRepository, InMemoryRecommendationRepository,
    InMemoryTradeRepository,
};

/// `DATABASE_URL` value selecting the process-local stores
pub const IN_MEMORY_STORE: &str = "memory";

pub struct PersistenceHandle {
    /// `None` when the in-memory stores are in use
    pub db: Option<Database>,
    pub ai_repository: Arc<dyn RecommendationRepository<AiRecommendation>>,
    pub legacy_repository: Arc<dyn RecommendationRepository<LegacyRecommendation>>,
    pub trade_repository: Arc<dyn TradeRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
    pub market_data_repository: Arc<dyn MarketDataRepository>,
}

impl PersistenceHandle {
    pub fn in_memory() -> Self {
        Self {
            db: None,
            ai_repository: Arc::new(InMemoryRecommendationRepository::<AiRecommendation>::new()),
            legacy_repository: Arc::new(
                InMemoryRecommendationRepository::<LegacyRecommendation>::new(),
            ),
            trade_repository: Arc::new(InMemoryTradeRepository::new()),
            audit_repository: Arc::new(InMemoryAuditRepository::new()),
            market_data_repository: Arc::new(InMemoryMarketDataRepository::new()),
        }
    }

    pub fn sqlite(db: Database) -> Self {
        Self {
            ai_repository: Arc::new(SqliteAiRecommendationRepository::new(db.clone())),
            legacy_repository: Arc::new(SqliteLegacyRecommendationRepository::new(db.clone())),
            trade_repository: Arc::new(SqliteTradeRepository::new(db.clone())),
            audit_repository: Arc::new(SqliteAuditRepository::new(db.clone())),
            market_data_repository: Arc::new(SqliteMarketDataRepository::new(db.clone())),
            db: Some(db),
        }
    }

    pub async fn health(&self) -> Result<()> {
        match &self.db {
            Some(db) => db.health().await,
            None => Ok(()),
        }
    }
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    pub async fn init(config: &PersistenceConfig) -> Result<PersistenceHandle> {
        if config.database_url == IN_MEMORY_STORE {
            info!("Using in-memory stores (data is lost on exit)");
            return Ok(PersistenceHandle::in_memory());
        }

        info!("Initializing Database at {}", config.database_url);
        let db = Database::new(&config.database_url)
            .await
            .context("Failed to initialize database")?;
        Ok(PersistenceHandle::sqlite(db))
    }
}
