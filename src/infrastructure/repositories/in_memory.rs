//! In-Memory Repository Implementations
//!
//! Thread-safe implementations of the repository traits defined in
//! `domain::repositories`, backed by `Arc<RwLock<..>>`.
//!
//! Used by `MODE=mock` and by tests. Each store carries a [`FaultInjector`]
//! so tests can make individual operations fail and observe how the
//! services degrade. Data is lost on restart.

use crate::domain::audit::{AuditEntity, AuditEntry};
use crate::domain::context::Candle;
use crate::domain::recommendation::StoredRecommendation;
use crate::domain::repositories::{
    AuditRepository, MarketDataRepository, RecommendationRepository, TradeRepository,
};
use crate::domain::trading::trade::Trade;
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

const ANY_OPERATION: &str = "*";

/// Named operations that should fail on purpose
#[derive(Default)]
pub struct FaultInjector {
    failing: std::sync::RwLock<HashSet<&'static str>>,
}

impl FaultInjector {
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(operation);
        }
    }

    pub fn set_failing(&self, failing: bool) {
        if failing {
            self.fail_on(ANY_OPERATION);
        } else {
            self.clear();
        }
    }

    pub fn clear(&self) {
        if let Ok(mut failing) = self.failing.write() {
            failing.clear();
        }
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        let tripped = self
            .failing
            .read()
            .map(|f| f.contains(operation) || f.contains(ANY_OPERATION))
            .unwrap_or(false);
        if tripped {
            bail!("injected failure in {}", operation);
        }
        Ok(())
    }
}

/// In-memory store for either recommendation form
pub struct InMemoryRecommendationRepository<R> {
    records: Arc<RwLock<Vec<R>>>,
    faults: FaultInjector,
}

impl<R: StoredRecommendation> InMemoryRecommendationRepository<R> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Every record, soft-deleted ones included
    pub async fn snapshot(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut R, DateTime<Utc>) -> bool + Send,
    {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id() == id && !r.is_deleted()) {
            Some(record) => Ok(apply(record, Utc::now())),
            None => Ok(false),
        }
    }
}

impl<R: StoredRecommendation> Default for InMemoryRecommendationRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: StoredRecommendation> RecommendationRepository<R> for InMemoryRecommendationRepository<R> {
    async fn create(&self, record: &R) -> Result<()> {
        self.faults.check("create")?;
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            bail!("duplicate recommendation id {}", record.id());
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<R>> {
        self.faults.check("find")?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.id() == id && !r.is_deleted())
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<R>> {
        self.faults.check("list")?;
        let records = self.records.read().await;
        let mut live: Vec<R> = records.iter().filter(|r| !r.is_deleted()).cloned().collect();
        live.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        live.truncate(limit);
        Ok(live)
    }

    async fn claim_pending(&self, id: &str) -> Result<bool> {
        self.faults.check("claim")?;
        self.update(id, |record, now| {
            if record.is_pending() {
                record.claim(now);
                true
            } else {
                false
            }
        })
        .await
    }

    async fn release_claim(&self, id: &str) -> Result<()> {
        self.faults.check("release")?;
        self.update(id, |record, now| {
            record.release(now);
            true
        })
        .await?;
        Ok(())
    }

    async fn mark_executed(&self, id: &str, trade_id: &str) -> Result<()> {
        self.faults.check("mark_executed")?;
        let found = self
            .update(id, |record, now| {
                record.mark_executed(trade_id, now);
                true
            })
            .await?;
        if !found {
            bail!("recommendation {} not found", id);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> Result<bool> {
        self.faults.check("soft_delete")?;
        self.update(id, |record, now| {
            record.soft_delete(now);
            true
        })
        .await
    }
}

pub struct InMemoryTradeRepository {
    trades: Arc<RwLock<Vec<Trade>>>,
    deleted: Arc<RwLock<HashSet<String>>>,
    faults: FaultInjector,
}

impl InMemoryTradeRepository {
    pub fn new() -> Self {
        Self {
            trades: Arc::new(RwLock::new(Vec::new())),
            deleted: Arc::new(RwLock::new(HashSet::new())),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub async fn count(&self) -> usize {
        self.trades.read().await.len()
    }
}

impl Default for InMemoryTradeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeRepository for InMemoryTradeRepository {
    async fn create(&self, trade: &Trade) -> Result<()> {
        self.faults.check("create")?;
        self.trades.write().await.push(trade.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Trade>> {
        self.faults.check("find")?;
        if self.deleted.read().await.contains(id) {
            return Ok(None);
        }
        let trades = self.trades.read().await;
        Ok(trades.iter().find(|t| t.id == id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Trade>> {
        self.faults.check("list")?;
        let deleted = self.deleted.read().await;
        let trades = self.trades.read().await;
        let mut live: Vec<Trade> = trades
            .iter()
            .filter(|t| !deleted.contains(&t.id))
            .cloned()
            .collect();
        live.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        live.truncate(limit);
        Ok(live)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool> {
        self.faults.check("soft_delete")?;
        let exists = self.trades.read().await.iter().any(|t| t.id == id);
        if !exists {
            return Ok(false);
        }
        Ok(self.deleted.write().await.insert(id.to_string()))
    }
}

pub struct InMemoryAuditRepository {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
    faults: FaultInjector,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            faults: FaultInjector::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.faults.set_failing(failing);
    }

    pub async fn all(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

impl Default for InMemoryAuditRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.faults.check("append")?;
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_for(&self, entity: AuditEntity, entity_id: &str) -> Result<Vec<AuditEntry>> {
        self.faults.check("list")?;
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.entity == entity && e.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.faults.check("list")?;
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

type CandleKey = (String, String, DateTime<Utc>);

#[derive(Default)]
pub struct InMemoryMarketDataRepository {
    candles: Arc<RwLock<BTreeMap<CandleKey, Candle>>>,
}

impl InMemoryMarketDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.candles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.candles.read().await.is_empty()
    }
}

#[async_trait]
impl MarketDataRepository for InMemoryMarketDataRepository {
    async fn upsert_candles(
        &self,
        instrument: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Result<()> {
        let mut stored = self.candles.write().await;
        for candle in candles {
            stored.insert(
                (instrument.to_string(), timeframe.to_string(), candle.time),
                candle.clone(),
            );
        }
        Ok(())
    }
}
