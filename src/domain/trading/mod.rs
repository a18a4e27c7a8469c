pub mod trade;
pub mod types;

pub use trade::{Trade, TradeStatus};
pub use types::{BrokerOrderId, Direction, MarketOrder, PriceObservation, Quote};
