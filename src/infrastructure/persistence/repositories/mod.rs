//! SQLite implementations of the domain repository traits.
//!
//! Decimals are stored as TEXT, timestamps as fixed-width RFC 3339 UTC TEXT
//! (so lexical order is chronological) and context blobs as JSON TEXT.

pub mod ai_recommendation_repository;
pub mod audit_repository;
pub mod legacy_recommendation_repository;
pub mod market_data_repository;
pub mod trade_repository;

pub use ai_recommendation_repository::SqliteAiRecommendationRepository;
pub use audit_repository::SqliteAuditRepository;
pub use legacy_recommendation_repository::SqliteLegacyRecommendationRepository;
pub use market_data_repository::SqliteMarketDataRepository;
pub use trade_repository::SqliteTradeRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in database: {}", raw))
}

pub(crate) fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("Invalid decimal in database: {}", raw))
}

pub(crate) fn parse_optional_decimal(raw: Option<String>) -> Result<Option<Decimal>> {
    raw.as_deref().map(parse_decimal).transpose()
}

pub(crate) fn parse_json(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_timestamp_text_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = a + chrono::Duration::microseconds(1500);
        assert_eq!(timestamp(&a), "2025-01-02T03:04:05.000000000Z");
        assert!(timestamp(&a) < timestamp(&b));
        assert_eq!(parse_timestamp(&timestamp(&b)).unwrap(), b);
    }

    #[test]
    fn test_decimal_columns() {
        assert_eq!(parse_decimal("1.09800").unwrap(), dec!(1.098));
        assert!(parse_decimal("abc").is_err());
        assert_eq!(parse_optional_decimal(None).unwrap(), None);
    }
}
