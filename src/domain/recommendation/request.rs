use crate::domain::errors::RecommendationError;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Stop-loss distance in pips; tighter stops for higher risk appetite
    pub fn stop_distance_pips(&self) -> Decimal {
        match self {
            RiskLevel::Low => dec!(30),
            RiskLevel::Medium => dec!(20),
            RiskLevel::High => dec!(10),
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Medium
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => anyhow::bail!("Invalid risk level: {}. Must be 'low', 'medium' or 'high'", s),
        }
    }
}

/// Smallest explicit stop-loss distance accepted, one pipette
pub const MIN_STOP_LOSS_PIPS: Decimal = dec!(0.1);

/// Caller input for recommendation generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub instruments: Vec<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    /// Fraction of equity at risk if the stop is hit (0.01 = 1%)
    #[serde(default)]
    pub risk_fraction: Option<Decimal>,
    #[serde(default)]
    pub time_horizon: String,
    /// Explicit unit count, used verbatim when present
    #[serde(default)]
    pub units: Option<Decimal>,
    #[serde(default)]
    pub stop_loss_pips: Option<Decimal>,
    /// Free-form operator notes forwarded to the model
    #[serde(default)]
    pub context: Option<String>,
}

impl RecommendationRequest {
    pub fn new(instruments: Vec<String>) -> Self {
        Self {
            instruments,
            ..Default::default()
        }
    }

    /// Reject malformed requests before any collaborator is called
    pub fn validate(&self) -> Result<(), RecommendationError> {
        if self.instruments.is_empty() {
            return Err(RecommendationError::invalid("instrument list is empty"));
        }
        if let Some(blank) = self.instruments.iter().position(|i| i.trim().is_empty()) {
            return Err(RecommendationError::invalid(format!(
                "instrument at position {} is blank",
                blank
            )));
        }
        if let Some(units) = self.units {
            check_units(units)?;
        }
        if let Some(fraction) = self.risk_fraction
            && (fraction <= Decimal::ZERO || fraction > Decimal::ONE)
        {
            return Err(RecommendationError::invalid(format!(
                "risk fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        if let Some(pips) = self.stop_loss_pips
            && pips < MIN_STOP_LOSS_PIPS
        {
            return Err(RecommendationError::invalid(format!(
                "stop-loss distance must be at least {} pips, got {}",
                MIN_STOP_LOSS_PIPS, pips
            )));
        }
        Ok(())
    }

    pub fn primary_instrument(&self) -> Option<&str> {
        self.instruments.first().map(|s| s.as_str())
    }

    pub fn effective_risk_level(&self) -> RiskLevel {
        self.risk_level.unwrap_or_default()
    }

    /// Explicit stop distance, else the risk-level table
    pub fn stop_distance_pips(&self) -> Decimal {
        self.stop_loss_pips
            .unwrap_or_else(|| self.effective_risk_level().stop_distance_pips())
    }

    /// How long a recommendation stays actionable when the draft names no expiry
    pub fn default_ttl(&self) -> Duration {
        match self.time_horizon.trim().to_lowercase().as_str() {
            "intraday" | "short" | "scalp" => Duration::hours(4),
            "long" | "swing" | "position" => Duration::days(7),
            _ => Duration::hours(24),
        }
    }
}

/// Order sizes are whole, positive units
pub fn check_units(units: Decimal) -> Result<(), RecommendationError> {
    if units <= Decimal::ZERO {
        return Err(RecommendationError::invalid(format!(
            "units must be positive, got {}",
            units
        )));
    }
    if !units.fract().is_zero() {
        return Err(RecommendationError::invalid(format!(
            "units must be a whole number, got {}",
            units
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_strictly_decreases_with_risk() {
        let low = RiskLevel::Low.stop_distance_pips();
        let medium = RiskLevel::Medium.stop_distance_pips();
        let high = RiskLevel::High.stop_distance_pips();
        assert!(low > medium);
        assert!(medium > high);
    }

    #[test]
    fn test_explicit_stop_distance_wins() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.risk_level = Some(RiskLevel::Low);
        assert_eq!(request.stop_distance_pips(), dec!(30));

        request.stop_loss_pips = Some(dec!(12.5));
        assert_eq!(request.stop_distance_pips(), dec!(12.5));
    }

    #[test]
    fn test_validate_rejects_malformed_requests() {
        assert!(matches!(
            RecommendationRequest::new(vec![]).validate(),
            Err(RecommendationError::InvalidRequest { .. })
        ));
        assert!(RecommendationRequest::new(vec!["  ".into()]).validate().is_err());

        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.risk_fraction = Some(dec!(1.5));
        assert!(request.validate().is_err());

        request.risk_fraction = Some(dec!(0.02));
        request.units = Some(dec!(0));
        assert!(request.validate().is_err());

        request.units = Some(dec!(1000));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_stop_distance() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.stop_loss_pips = Some(dec!(0.0000000000000000000000001));
        assert!(matches!(
            request.validate(),
            Err(RecommendationError::InvalidRequest { .. })
        ));

        request.stop_loss_pips = Some(dec!(0.05));
        assert!(request.validate().is_err());

        request.stop_loss_pips = Some(MIN_STOP_LOSS_PIPS);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_fractional_units() {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".into()]);
        request.units = Some(dec!(12.5));
        assert!(request.validate().is_err());

        request.units = Some(dec!(0.4));
        assert!(request.validate().is_err());

        // Trailing zeros are still whole
        request.units = Some(dec!(12.000));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"instruments":["USD_JPY"],"risk_level":"high"}"#).unwrap();
        assert_eq!(request.risk_level, Some(RiskLevel::High));
        assert_eq!(request.units, None);
        assert_eq!(request.default_ttl(), Duration::hours(24));
    }
}
