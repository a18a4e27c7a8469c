pub mod in_memory;

pub use in_memory::{
    FaultInjector, InMemoryAuditRepository, InMemoryMarketDataRepository,
    InMemoryRecommendationRepository, InMemoryTradeRepository,
};
