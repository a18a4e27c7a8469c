use crate::domain::context::TradingContext;
use crate::domain::errors::RecommendationError;
use crate::domain::ports::{HistoricalDataProvider, MarketDataProvider, NewsProvider};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

/// Gathers market, news and historical snapshots for one instrument set.
///
/// The three fetches run concurrently. When several fail, the reported error
/// is market first, then news, then historical, whatever order they
/// completed in. No retries happen here.
pub struct ContextAggregator {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    historical: Arc<dyn HistoricalDataProvider>,
}

impl ContextAggregator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        historical: Arc<dyn HistoricalDataProvider>,
    ) -> Self {
        Self {
            market,
            news,
            historical,
        }
    }

    pub async fn gather(&self, instruments: &[String]) -> Result<TradingContext, RecommendationError> {
        if instruments.is_empty() {
            return Err(RecommendationError::invalid("instrument list is empty"));
        }

        let (market, news, historical) = tokio::join!(
            self.market.fetch_market(instruments),
            self.news.fetch_news(instruments),
            self.historical.fetch_historical(instruments),
        );

        let market = market.map_err(|e| {
            error!("ContextAggregator: market fetch failed for {:?}: {:#}", instruments, e);
            RecommendationError::MarketFetchFailed {
                reason: format!("{:#}", e),
            }
        })?;
        let news = news.map_err(|e| {
            error!("ContextAggregator: news fetch failed for {:?}: {:#}", instruments, e);
            RecommendationError::NewsFetchFailed {
                reason: format!("{:#}", e),
            }
        })?;
        let historical = historical.map_err(|e| {
            error!("ContextAggregator: historical fetch failed for {:?}: {:#}", instruments, e);
            RecommendationError::HistoricalFetchFailed {
                reason: format!("{:#}", e),
            }
        })?;

        let context = TradingContext {
            assembled_at: Utc::now(),
            market,
            news,
            historical,
        };
        debug!(
            "ContextAggregator: assembled context for {:?} ({} news items)",
            instruments,
            context.news.len()
        );
        Ok(context)
    }
}
