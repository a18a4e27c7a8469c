use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::bootstrap::persistence::PersistenceHandle;
use crate::config::{Config, Mode};
use crate::domain::ports::{
    BrokerService, HistoricalDataProvider, MarketDataProvider, NewsProvider, RecommendationModel,
};
use crate::infrastructure::ai::AnthropicModel;
use crate::infrastructure::mock::{MockBroker, MockMarketDataService, MockNewsProvider};
use crate::infrastructure::news::BraveNewsProvider;
use crate::infrastructure::oanda::{OandaBroker, OandaClient, OandaMarketDataService};

/// External collaborators selected by `MODE`
pub struct ServicesHandle {
    pub broker: Arc<dyn BrokerService>,
    pub market: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub historical: Arc<dyn HistoricalDataProvider>,
    pub model: Option<Arc<dyn RecommendationModel>>,
}

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    pub fn init(config: &Config, persistence: &PersistenceHandle) -> Result<ServicesHandle> {
        let model: Option<Arc<dyn RecommendationModel>> = if config.anthropic.api_key.is_empty() {
            info!("ANTHROPIC_API_KEY not set, drafts will be heuristic");
            None
        } else {
            info!("Using Anthropic model {}", config.anthropic.model);
            Some(Arc::new(AnthropicModel::new(
                config.anthropic.clone(),
                &config.http,
            )))
        };

        match config.mode {
            Mode::Mock => {
                info!("Using Mock services");
                let broker = MockBroker::new();
                let market = Arc::new(MockMarketDataService::new(broker.clone()));
                Ok(ServicesHandle {
                    broker: Arc::new(broker),
                    market: market.clone(),
                    news: Arc::new(MockNewsProvider),
                    historical: market,
                    model,
                })
            }
            Mode::Oanda => {
                info!("Using OANDA services ({})", config.oanda.api_base_url);
                let client = OandaClient::new(config.oanda.clone(), &config.http);
                let candle_store = config
                    .oanda
                    .store_candles
                    .then(|| persistence.market_data_repository.clone());
                let market = Arc::new(OandaMarketDataService::new(client.clone(), candle_store));
                Ok(ServicesHandle {
                    broker: Arc::new(OandaBroker::new(client)),
                    market: market.clone(),
                    news: Arc::new(BraveNewsProvider::new(config.brave.clone(), &config.http)),
                    historical: market,
                    model,
                })
            }
        }
    }
}
