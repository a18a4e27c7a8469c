use thiserror::Error;

/// Errors surfaced by the recommendation lifecycle (generation, storage, acceptance)
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Market data fetch failed: {reason}")]
    MarketFetchFailed { reason: String },

    #[error("News fetch failed: {reason}")]
    NewsFetchFailed { reason: String },

    #[error("Historical data fetch failed: {reason}")]
    HistoricalFetchFailed { reason: String },

    #[error("Not found: {id}")]
    NotFound { id: String },

    #[error("Recommendation {id} is already being processed")]
    Conflict { id: String },

    #[error("Broker rejected order: {reason}")]
    BrokerRejected { reason: String },

    #[error("Persistence failure: {reason}")]
    Persistence { reason: String },

    #[error("Execution task aborted: {reason}")]
    Internal { reason: String },
}

impl RecommendationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn persistence(err: &anyhow::Error) -> Self {
        Self::Persistence {
            reason: format!("{:#}", err),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// True for failures the caller may resolve by issuing the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::MarketFetchFailed { .. }
                | Self::NewsFetchFailed { .. }
                | Self::HistoricalFetchFailed { .. }
                | Self::Persistence { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_rejection_keeps_message_verbatim() {
        let err = RecommendationError::BrokerRejected {
            reason: "order failed status 400: {\"errorMessage\":\"INSUFFICIENT_MARGIN\"}".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("INSUFFICIENT_MARGIN"));
        assert!(msg.contains("status 400"));
    }

    #[test]
    fn test_persistence_error_includes_context_chain() {
        let source = anyhow::anyhow!("disk I/O error").context("Failed to save trade");
        let err = RecommendationError::persistence(&source);

        let msg = err.to_string();
        assert!(msg.contains("Failed to save trade"));
        assert!(msg.contains("disk I/O error"));
    }

    #[test]
    fn test_terminal_errors_are_not_retryable() {
        assert!(!RecommendationError::not_found("abc").is_retryable());
        assert!(
            !RecommendationError::BrokerRejected {
                reason: "x".into()
            }
            .is_retryable()
        );
        assert!(
            RecommendationError::NewsFetchFailed {
                reason: "timeout".into()
            }
            .is_retryable()
        );
    }
}
