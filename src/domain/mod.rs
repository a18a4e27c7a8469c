// Audit log entries
pub mod audit;

// Market/news/historical context
pub mod context;

// Port interfaces
pub mod ports;

// Recommendation request, drafts and stored forms
pub mod recommendation;

// Repository traits
pub mod repositories;

// Orders, quotes and trades
pub mod trading;

// Domain-specific error types
pub mod errors;
