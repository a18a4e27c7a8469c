use super::audit_trail::AuditTrail;
use super::recommendation_store::RecommendationStore;
use crate::domain::audit::AuditEntity;
use crate::domain::errors::RecommendationError;
use crate::domain::ports::BrokerService;
use crate::domain::recommendation::{ResolvedRecommendation, check_units};
use crate::domain::repositories::TradeRepository;
use crate::domain::trading::trade::Trade;
use crate::domain::trading::types::{BrokerOrderId, Direction, MarketOrder, PriceObservation};
use crate::infrastructure::observability::Metrics;
use rust_decimal::Decimal;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Turns accepted recommendations (or direct requests) into broker orders
/// and records the outcome.
///
/// A recommendation is claimed (PENDING -> EXECUTED) before the broker is
/// called, so concurrent accepts of one id submit at most one order. The
/// claim covers a single record: an AI recommendation and its legacy mirror
/// are claimed independently, so accepting both places two orders. Once
/// the broker has accepted an order, every follow-up write is best-effort
/// and runs on a detached task: dropping the caller's future does not stop
/// it.
#[derive(Clone)]
pub struct ExecutionEngine {
    broker: Arc<dyn BrokerService>,
    store: RecommendationStore,
    trades: Arc<dyn TradeRepository>,
    audit: AuditTrail,
    metrics: Metrics,
}

impl ExecutionEngine {
    pub fn new(
        broker: Arc<dyn BrokerService>,
        store: RecommendationStore,
        trades: Arc<dyn TradeRepository>,
        audit: AuditTrail,
        metrics: Metrics,
    ) -> Self {
        Self {
            broker,
            store,
            trades,
            audit,
            metrics,
        }
    }

    pub async fn accept(&self, id: &str) -> Result<Trade, RecommendationError> {
        let engine = self.clone();
        let id = id.to_string();
        detached(async move { engine.accept_inner(&id).await }).await
    }

    /// Submit an order that bypasses recommendations
    pub async fn place_order(
        &self,
        instrument: &str,
        direction: Direction,
        units: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Result<Trade, RecommendationError> {
        if instrument.trim().is_empty() {
            return Err(RecommendationError::invalid("instrument is required"));
        }
        check_units(units)?;

        let order = MarketOrder::plain(instrument.trim(), direction, units)
            .with_bracket(positive(stop_loss), positive(take_profit));
        let engine = self.clone();
        detached(async move {
            let broker_order = engine.broker.submit_market_order(&order).await.map_err(|e| {
                warn!("ExecutionEngine: direct {} order rejected: {:#}", order.instrument, e);
                RecommendationError::BrokerRejected {
                    reason: format!("{:#}", e),
                }
            })?;
            engine.metrics.inc_orders(order.kind());
            info!(
                "ExecutionEngine: direct {} {} x{} placed as order {}",
                order.direction, order.instrument, order.units, broker_order
            );
            Ok(engine.record_trade(&order, &broker_order, None).await)
        })
        .await
    }

    async fn accept_inner(&self, id: &str) -> Result<Trade, RecommendationError> {
        let resolved = match self.store.resolve(id).await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.metrics.inc_accepted(outcome_label(&e));
                return Err(e);
            }
        };

        if !self.store.claim(&resolved).await? {
            warn!("ExecutionEngine: {} was claimed by another request", id);
            self.metrics.inc_accepted("conflict");
            return Err(RecommendationError::Conflict { id: id.to_string() });
        }

        let (stop_loss, take_profit) = resolved.bracket();
        let order = MarketOrder::plain(resolved.instrument(), resolved.direction(), resolved.units())
            .with_bracket(stop_loss, take_profit);

        let broker_order = match self.broker.submit_market_order(&order).await {
            Ok(broker_order) => broker_order,
            Err(e) => {
                warn!(
                    "ExecutionEngine: broker rejected {} for {}: {:#}",
                    order.kind(),
                    id,
                    e
                );
                self.store.release(&resolved).await;
                self.metrics.inc_accepted("rejected");
                return Err(RecommendationError::BrokerRejected {
                    reason: format!("{:#}", e),
                });
            }
        };
        self.metrics.inc_orders(order.kind());
        info!(
            "ExecutionEngine: {} {} {} x{} accepted as order {} ({})",
            id,
            order.direction,
            order.instrument,
            order.units,
            broker_order,
            order.kind()
        );

        // Past this point the order exists; nothing below may fail the call.
        self.store.mark_executed(&resolved, &broker_order.0).await;
        let trade = self
            .record_trade(&order, &broker_order, Some(&resolved))
            .await;
        self.metrics.inc_accepted("executed");
        Ok(trade)
    }

    /// Build the trade for a placed order and store it, best-effort
    async fn record_trade(
        &self,
        order: &MarketOrder,
        broker_order: &BrokerOrderId,
        source: Option<&ResolvedRecommendation>,
    ) -> Trade {
        let entry = self.entry_price(&order.instrument).await;
        let trade = Trade::open(
            &order.instrument,
            order.direction,
            order.units,
            entry,
            broker_order,
        );

        match self.trades.create(&trade).await {
            Ok(()) => {
                self.audit
                    .created(
                        AuditEntity::Trade,
                        &trade.id,
                        json!({
                            "instrument": trade.instrument,
                            "direction": trade.direction,
                            "units": trade.units,
                            "entry_price": trade.entry_price,
                            "broker_order_id": broker_order.0,
                            "recommendation_id": source.map(|s| s.id()),
                            "kind": order.kind(),
                        }),
                    )
                    .await;
            }
            Err(e) => {
                error!(
                    "ExecutionEngine: order {} placed but trade row failed: {:#}",
                    broker_order, e
                );
                self.metrics.inc_best_effort_failure("trade_create");
            }
        }
        trade
    }

    async fn entry_price(&self, instrument: &str) -> PriceObservation {
        match self.broker.current_price(instrument).await {
            Ok(quote) => PriceObservation::from_quote(&quote),
            Err(e) => {
                warn!(
                    "ExecutionEngine: no quote for {} after fill, entry price unknown: {:#}",
                    instrument, e
                );
                PriceObservation::Unknown
            }
        }
    }
}

/// Run `work` on its own task so caller cancellation cannot cut it short
async fn detached<F, T>(work: F) -> Result<T, RecommendationError>
where
    F: Future<Output = Result<T, RecommendationError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| RecommendationError::Internal {
            reason: e.to_string(),
        })?
}

fn positive(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|p| *p > Decimal::ZERO)
}

fn outcome_label(err: &RecommendationError) -> &'static str {
    match err {
        RecommendationError::NotFound { .. } => "not_found",
        RecommendationError::Conflict { .. } => "conflict",
        RecommendationError::BrokerRejected { .. } => "rejected",
        _ => "error",
    }
}
