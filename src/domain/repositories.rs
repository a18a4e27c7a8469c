//! Repository Pattern Abstractions
//!
//! Storage traits for recommendations, trades and the audit log. Services
//! receive them as `Arc<dyn ...>` chosen at construction, so the same engine
//! runs against SQLite in production and the in-memory stores in tests.
//!
//! Nothing here deletes a row: removal is a `deleted_at` flag, and every
//! finder/lister skips flagged rows.

use crate::domain::audit::{AuditEntity, AuditEntry};
use crate::domain::context::Candle;
use crate::domain::trading::trade::Trade;
use anyhow::Result;
use async_trait::async_trait;

/// Store for one recommendation form (`AiRecommendation` or `LegacyRecommendation`)
#[async_trait]
pub trait RecommendationRepository<R>: Send + Sync
where
    R: Send + Sync,
{
    async fn create(&self, record: &R) -> Result<()>;

    /// Soft-deleted records are not returned
    async fn find_by_id(&self, id: &str) -> Result<Option<R>>;

    /// Newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<R>>;

    /// Atomically move PENDING -> EXECUTED. Returns false if the record is
    /// missing, deleted or no longer PENDING.
    async fn claim_pending(&self, id: &str) -> Result<bool>;

    /// Undo a claim after the broker rejected the order
    async fn release_claim(&self, id: &str) -> Result<()>;

    /// Set EXECUTED with the linked trade reference
    async fn mark_executed(&self, id: &str, trade_id: &str) -> Result<()>;

    /// Returns false when no live record with this id exists
    async fn soft_delete(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait TradeRepository: Send + Sync {
    async fn create(&self, trade: &Trade) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Trade>>;

    /// Newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Trade>>;

    async fn soft_delete(&self, id: &str) -> Result<bool>;
}

/// Append-only; there is no update or delete
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Oldest first, for one entity
    async fn list_for(&self, entity: AuditEntity, entity_id: &str) -> Result<Vec<AuditEntry>>;

    /// Newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditEntry>>;
}

/// Raw candle snapshots written by market data adapters
#[async_trait]
pub trait MarketDataRepository: Send + Sync {
    async fn upsert_candles(&self, instrument: &str, timeframe: &str, candles: &[Candle])
    -> Result<()>;
}
