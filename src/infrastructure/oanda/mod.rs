//! OANDA v3 REST adapters: broker (pricing, NAV, orders) and market data
//! (pricing plus candles).

pub mod api_types;
pub mod client;
pub mod execution;
pub mod market_data;

pub use client::OandaClient;
pub use execution::OandaBroker;
pub use market_data::{OandaMarketDataService, summarize_daily};
