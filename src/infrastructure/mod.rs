pub mod ai;
pub mod core;
pub mod mock;
pub mod news;
pub mod oanda;
pub mod observability;
pub mod persistence;
pub mod repositories;

pub use repositories::{
    InMemoryAuditRepository, InMemoryRecommendationRepository, InMemoryTradeRepository,
};
