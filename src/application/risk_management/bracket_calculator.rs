use super::sizing_engine::SizingEngine;
use crate::domain::recommendation::{DraftRecommendation, PricedRecommendation, RecommendationRequest};
use crate::domain::trading::types::{Direction, PriceObservation, pip_size};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

/// Take-profit distance as a multiple of the stop-loss distance
pub const REWARD_RISK_RATIO: Decimal = dec!(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// Stop-loss/take-profit levels and final sizing. No I/O.
pub struct BracketCalculator;

impl BracketCalculator {
    /// Bracket around `price`, or `None` for a non-positive price.
    pub fn bracket(
        instrument: &str,
        direction: Direction,
        price: Decimal,
        distance_pips: Decimal,
    ) -> Option<Bracket> {
        if price <= Decimal::ZERO || distance_pips <= Decimal::ZERO {
            return None;
        }

        let stop_offset = distance_pips * pip_size(instrument);
        let profit_offset = stop_offset * REWARD_RISK_RATIO;
        let bracket = match direction {
            Direction::Buy => Bracket {
                stop_loss: price - stop_offset,
                take_profit: price + profit_offset,
            },
            Direction::Sell => Bracket {
                stop_loss: price + stop_offset,
                take_profit: price - profit_offset,
            },
        };
        Some(bracket)
    }

    /// Enrich a draft with bracket levels, size and expiry.
    ///
    /// Without a known price the recommendation carries no bracket, and
    /// risk-based sizing only applies when the request names its own stop
    /// distance.
    pub fn price(
        draft: DraftRecommendation,
        current_price: PriceObservation,
        account_equity: Option<Decimal>,
        request: &RecommendationRequest,
    ) -> PricedRecommendation {
        let distance_pips = request.stop_distance_pips();

        let bracket = current_price
            .value()
            .and_then(|p| Self::bracket(&draft.instrument, draft.direction, p, distance_pips));
        if bracket.is_none() {
            warn!(
                "BracketCalculator: no usable price for {}, storing without bracket",
                draft.instrument
            );
        }

        let resolvable_stop = if request.stop_loss_pips.is_some() || bracket.is_some() {
            Some(distance_pips)
        } else {
            None
        };
        let (units, sizing) = SizingEngine::resolve_units(
            &draft.instrument,
            request,
            draft.units,
            account_equity,
            resolvable_stop,
        );

        let expires_at = draft
            .expires_at
            .unwrap_or_else(|| draft.context.assembled_at + request.default_ttl());

        debug!(
            "BracketCalculator: {} {} units={} sl={:?} tp={:?} ({:?})",
            draft.direction,
            draft.instrument,
            units,
            bracket.map(|b| b.stop_loss),
            bracket.map(|b| b.take_profit),
            sizing
        );

        PricedRecommendation {
            id: draft.id,
            instrument: draft.instrument,
            direction: draft.direction,
            units,
            confidence: draft.confidence,
            rationale: draft.rationale,
            entry_price: current_price,
            stop_loss: bracket.map(|b| b.stop_loss),
            take_profit: bracket.map(|b| b.take_profit),
            sizing,
            expires_at,
            source: draft.source,
            context: draft.context,
        }
    }
}
