// Recommendation lifecycle services
pub mod audit_trail;
pub mod context_aggregator;
pub mod drafter;
pub mod execution_engine;
pub mod recommendation_service;
pub mod recommendation_store;

// Sizing and protective brackets
pub mod risk_management;

// Wiring
pub mod bootstrap;
pub mod system;
