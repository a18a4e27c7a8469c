use crate::domain::recommendation::{RecommendationRequest, SizingBasis};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, info};

/// Account-currency value of one pip per unit (10 per standard 100k lot).
///
/// A flat approximation: it is not adjusted for the quote currency or
/// crosses, so sizes on non-USD-quoted pairs are only indicative.
pub const PIP_VALUE_PER_UNIT: Decimal = dec!(0.0001);

/// Smallest size a risk-based calculation may produce
pub const MIN_UNITS: Decimal = Decimal::ONE;

pub struct SizingEngine;

impl SizingEngine {
    /// `round(equity * fraction / (stop_pips * PIP_VALUE_PER_UNIT))`, floored at one unit.
    ///
    /// `None` when any input is non-positive or the arithmetic leaves the
    /// decimal range.
    pub fn risk_based_units(
        equity: Decimal,
        risk_fraction: Decimal,
        stop_distance_pips: Decimal,
    ) -> Option<Decimal> {
        if equity <= Decimal::ZERO
            || risk_fraction <= Decimal::ZERO
            || stop_distance_pips <= Decimal::ZERO
        {
            return None;
        }

        let risk_amount = equity.checked_mul(risk_fraction)?;
        let risk_per_unit = stop_distance_pips
            .checked_mul(PIP_VALUE_PER_UNIT)
            .filter(|r| !r.is_zero())?;
        let raw = risk_amount.checked_div(risk_per_unit)?;
        let units = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Some(units.max(MIN_UNITS))
    }

    /// Pick the final unit count.
    ///
    /// Explicit request units win; then risk-based sizing when a fraction,
    /// equity and a resolvable stop distance are all present; otherwise the
    /// draft's own value is kept.
    pub fn resolve_units(
        instrument: &str,
        request: &RecommendationRequest,
        draft_units: Decimal,
        equity: Option<Decimal>,
        stop_distance_pips: Option<Decimal>,
    ) -> (Decimal, SizingBasis) {
        if let Some(units) = request.units {
            debug!("SizingEngine: explicit size for {}: {}", instrument, units);
            return (units.abs(), SizingBasis::Explicit);
        }

        let sized = match (request.risk_fraction, equity, stop_distance_pips) {
            (Some(fraction), Some(equity), Some(pips)) => {
                Self::risk_based_units(equity, fraction, pips)
            }
            _ => None,
        };

        match sized {
            Some(units) => {
                info!(
                    "SizingEngine: risk-based size for {}: {} units (fraction={:?}, equity={:?}, stop={:?} pips)",
                    instrument, units, request.risk_fraction, equity, stop_distance_pips
                );
                (units, SizingBasis::RiskBased)
            }
            None => (draft_units.abs(), SizingBasis::DraftDefault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_value_matches_standard_lot() {
        assert_eq!(PIP_VALUE_PER_UNIT, dec!(10) / dec!(100000));
    }

    #[test]
    fn test_risk_based_units_reference_case() {
        // 10000 * 0.01 = 100 at risk, 25 pips * 0.0001 per unit = 0.0025 per unit
        let units = SizingEngine::risk_based_units(dec!(10000), dec!(0.01), dec!(25)).unwrap();
        assert_eq!(units, dec!(40000));
    }

    #[test]
    fn test_risk_based_units_rounds_half_away_from_zero() {
        // 1 * 0.0125 / (100 * 0.0001) = 1.25 -> 1 ; 0.03 / 0.02 = 1.5 -> 2
        assert_eq!(
            SizingEngine::risk_based_units(dec!(1), dec!(0.0125), dec!(100)),
            Some(dec!(1))
        );
        assert_eq!(
            SizingEngine::risk_based_units(dec!(3), dec!(0.01), dec!(200)),
            Some(dec!(2))
        );
    }

    #[test]
    fn test_risk_based_units_never_below_one() {
        let units = SizingEngine::risk_based_units(dec!(1), dec!(0.0001), dec!(500)).unwrap();
        assert_eq!(units, MIN_UNITS);
    }

    #[test]
    fn test_risk_based_units_rejects_non_positive_inputs() {
        assert_eq!(SizingEngine::risk_based_units(dec!(0), dec!(0.01), dec!(20)), None);
        assert_eq!(SizingEngine::risk_based_units(dec!(1000), dec!(0), dec!(20)), None);
        assert_eq!(SizingEngine::risk_based_units(dec!(1000), dec!(0.01), dec!(0)), None);
    }

    #[test]
    fn test_risk_based_units_out_of_range_is_none() {
        // 1e-25 pips * 0.0001 underflows to zero
        assert_eq!(
            SizingEngine::risk_based_units(dec!(10000), dec!(0.01), dec!(0.0000000000000000000000001)),
            None
        );
        assert_eq!(
            SizingEngine::risk_based_units(Decimal::MAX, dec!(1), dec!(0.0001)),
            None
        );
    }

    #[test]
    fn test_unsizeable_stop_keeps_draft_units() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.risk_fraction = Some(dec!(0.01));

        let (units, basis) = SizingEngine::resolve_units(
            "EUR_USD",
            &request,
            dec!(100),
            Some(dec!(10000)),
            Some(dec!(0.0000000000000000000000001)),
        );
        assert_eq!(units, dec!(100));
        assert_eq!(basis, SizingBasis::DraftDefault);
    }

    #[test]
    fn test_explicit_units_used_verbatim() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.units = Some(dec!(1234));
        request.risk_fraction = Some(dec!(0.02));

        let (units, basis) = SizingEngine::resolve_units(
            "EUR_USD",
            &request,
            dec!(100),
            Some(dec!(50000)),
            Some(dec!(20)),
        );
        assert_eq!(units, dec!(1234));
        assert_eq!(basis, SizingBasis::Explicit);
    }

    #[test]
    fn test_falls_back_to_draft_units_without_stop_distance() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.risk_fraction = Some(dec!(0.02));

        let (units, basis) =
            SizingEngine::resolve_units("EUR_USD", &request, dec!(250), Some(dec!(50000)), None);
        assert_eq!(units, dec!(250));
        assert_eq!(basis, SizingBasis::DraftDefault);

        let (units, basis) =
            SizingEngine::resolve_units("EUR_USD", &request, dec!(250), None, Some(dec!(20)));
        assert_eq!(units, dec!(250));
        assert_eq!(basis, SizingBasis::DraftDefault);
    }
}
