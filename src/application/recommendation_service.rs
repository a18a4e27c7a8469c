use super::audit_trail::AuditTrail;
use super::context_aggregator::ContextAggregator;
use super::drafter::RecommendationDrafter;
use super::execution_engine::ExecutionEngine;
use super::recommendation_store::{RecommendationStore, normalize_limit};
use super::risk_management::BracketCalculator;
use crate::domain::audit::AuditEntity;
use crate::domain::errors::RecommendationError;
use crate::domain::ports::BrokerService;
use crate::domain::recommendation::{
    PricedRecommendation, RecommendationListing, RecommendationRequest,
};
use crate::domain::repositories::TradeRepository;
use crate::domain::trading::trade::Trade;
use crate::domain::trading::types::{Direction, PriceObservation};
use crate::infrastructure::observability::Metrics;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for the transport layer: generation, listing, acceptance,
/// direct orders and soft deletes.
pub struct RecommendationService {
    aggregator: ContextAggregator,
    drafter: RecommendationDrafter,
    broker: Arc<dyn BrokerService>,
    store: RecommendationStore,
    engine: ExecutionEngine,
    trades: Arc<dyn TradeRepository>,
    audit: AuditTrail,
    metrics: Metrics,
}

impl RecommendationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aggregator: ContextAggregator,
        drafter: RecommendationDrafter,
        broker: Arc<dyn BrokerService>,
        store: RecommendationStore,
        engine: ExecutionEngine,
        trades: Arc<dyn TradeRepository>,
        audit: AuditTrail,
        metrics: Metrics,
    ) -> Self {
        Self {
            aggregator,
            drafter,
            broker,
            store,
            engine,
            trades,
            audit,
            metrics,
        }
    }

    /// Aggregate, draft, price and persist one recommendation.
    ///
    /// The returned value carries the id the store assigned.
    pub async fn generate(
        &self,
        request: RecommendationRequest,
    ) -> Result<PricedRecommendation, RecommendationError> {
        request.validate()?;

        let context = self.aggregator.gather(&request.instruments).await?;
        let draft = self.drafter.draft(context, &request).await?;

        let price = self.current_price(&draft.instrument, || {
            draft.context.market.reference_price(&draft.instrument)
        })
        .await;
        let equity = if request.risk_fraction.is_some() && request.units.is_none() {
            self.account_equity().await
        } else {
            None
        };

        let mut priced = BracketCalculator::price(draft, price, equity, &request);
        let record = self.store.create(&priced).await?;
        priced.id = Some(record.id);

        self.metrics.inc_generated(priced.source.label());
        info!(
            "RecommendationService: generated {:?} via {} ({:?} sizing)",
            priced.id, priced.source, priced.sizing
        );
        Ok(priced)
    }

    pub async fn list(&self, limit: i64) -> Result<RecommendationListing, RecommendationError> {
        self.store.list(limit).await
    }

    pub async fn accept(&self, id: &str) -> Result<Trade, RecommendationError> {
        self.engine.accept(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<AuditEntity, RecommendationError> {
        self.store.soft_delete(id).await
    }

    pub async fn place_order(
        &self,
        instrument: &str,
        direction: Direction,
        units: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Result<Trade, RecommendationError> {
        self.engine
            .place_order(instrument, direction, units, stop_loss, take_profit)
            .await
    }

    pub async fn list_trades(&self, limit: i64) -> Result<Vec<Trade>, RecommendationError> {
        self.trades
            .list_recent(normalize_limit(limit))
            .await
            .map_err(|e| RecommendationError::persistence(&e))
    }

    pub async fn delete_trade(&self, id: &str) -> Result<(), RecommendationError> {
        let deleted = self
            .trades
            .soft_delete(id)
            .await
            .map_err(|e| RecommendationError::persistence(&e))?;
        if !deleted {
            return Err(RecommendationError::not_found(id));
        }
        self.audit.deleted(AuditEntity::Trade, id).await;
        Ok(())
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Broker quote mid, else `fallback` (last snapshot close)
    async fn current_price<F>(&self, instrument: &str, fallback: F) -> PriceObservation
    where
        F: FnOnce() -> Option<Decimal>,
    {
        match self.broker.current_price(instrument).await {
            Ok(quote) if quote.mid().is_some() => PriceObservation::from_quote(&quote),
            Ok(_) => {
                warn!("RecommendationService: empty quote for {}, using snapshot", instrument);
                PriceObservation::from_option(fallback())
            }
            Err(e) => {
                warn!(
                    "RecommendationService: price lookup for {} failed, using snapshot: {:#}",
                    instrument, e
                );
                PriceObservation::from_option(fallback())
            }
        }
    }

    async fn account_equity(&self) -> Option<Decimal> {
        match self.broker.account_equity().await {
            Ok(nav) if nav > Decimal::ZERO => Some(nav),
            Ok(nav) => {
                warn!("RecommendationService: non-positive equity {}, skipping risk sizing", nav);
                None
            }
            Err(e) => {
                warn!("RecommendationService: equity lookup failed, skipping risk sizing: {:#}", e);
                None
            }
        }
    }
}
