use crate::domain::context::TradingContext;
use crate::domain::errors::RecommendationError;
use crate::domain::ports::RecommendationModel;
use crate::domain::recommendation::{
    DEFAULT_DRAFT_UNITS, DraftRecommendation, DraftSource, HEURISTIC_CONFIDENCE, ModelDraft,
    RecommendationRequest,
};
use crate::domain::trading::types::Direction;
use rust_decimal::RoundingStrategy;
use std::sync::Arc;
use tracing::{info, warn};

/// Produces a draft for every valid request.
///
/// Model failures of any kind, including a missing model, degrade to a
/// fixed heuristic draft on the first requested instrument.
pub struct RecommendationDrafter {
    model: Option<Arc<dyn RecommendationModel>>,
}

impl RecommendationDrafter {
    pub fn new(model: Option<Arc<dyn RecommendationModel>>) -> Self {
        Self { model }
    }

    pub async fn draft(
        &self,
        context: TradingContext,
        request: &RecommendationRequest,
    ) -> Result<DraftRecommendation, RecommendationError> {
        let Some(primary) = request.primary_instrument() else {
            return Err(RecommendationError::invalid("instrument list is empty"));
        };

        let Some(model) = &self.model else {
            return Ok(Self::heuristic(primary, context, "no model configured"));
        };

        match model.draft(&context, request).await {
            Ok(raw) => match Self::normalise(raw, request) {
                Ok(clean) => {
                    info!(
                        "Drafter: {} proposed {} {} (confidence {:.2})",
                        model.name(),
                        clean.direction,
                        clean.instrument,
                        clean.confidence
                    );
                    Ok(DraftRecommendation {
                        id: clean.id,
                        instrument: clean.instrument,
                        direction: clean.direction,
                        confidence: clean.confidence,
                        rationale: clean.rationale,
                        units: clean.units.unwrap_or(DEFAULT_DRAFT_UNITS),
                        expires_at: clean.expires_at,
                        source: DraftSource::ModelDerived {
                            model: model.name().to_string(),
                        },
                        context,
                    })
                }
                Err(reason) => {
                    warn!("Drafter: discarding {} draft: {}", model.name(), reason);
                    Ok(Self::heuristic(primary, context, &reason))
                }
            },
            Err(e) => {
                warn!("Drafter: {} unavailable, using heuristic: {:#}", model.name(), e);
                Ok(Self::heuristic(primary, context, &format!("{:#}", e)))
            }
        }
    }

    /// Check a raw model answer against the request and clean it up
    fn normalise(mut raw: ModelDraft, request: &RecommendationRequest) -> Result<ModelDraft, String> {
        let instrument = raw.instrument.trim();
        let instrument = if instrument.is_empty() {
            request.primary_instrument().unwrap_or_default().to_string()
        } else {
            instrument.to_uppercase()
        };
        if !request
            .instruments
            .iter()
            .any(|i| i.eq_ignore_ascii_case(&instrument))
        {
            return Err(format!("instrument {} was not requested", instrument));
        }
        if !raw.confidence.is_finite() {
            return Err("confidence is not a number".to_string());
        }

        raw.instrument = instrument;
        raw.confidence = raw.confidence.clamp(0.0, 1.0);
        raw.units = raw
            .units
            .map(|u| u.abs().round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .filter(|u| !u.is_zero());
        Ok(raw)
    }

    fn heuristic(primary: &str, context: TradingContext, reason: &str) -> DraftRecommendation {
        DraftRecommendation {
            id: None,
            instrument: primary.to_string(),
            direction: Direction::Buy,
            confidence: HEURISTIC_CONFIDENCE,
            rationale: format!("Heuristic recommendation for {} ({})", primary, reason),
            units: DEFAULT_DRAFT_UNITS,
            expires_at: None,
            source: DraftSource::Heuristic {
                reason: reason.to_string(),
            },
            context,
        }
    }
}
