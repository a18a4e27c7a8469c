use super::timestamp;
use crate::domain::context::Candle;
use crate::domain::repositories::MarketDataRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Raw candles keyed by (instrument, timestamp, timeframe)
pub struct SqliteMarketDataRepository {
    database: Database,
}

impl SqliteMarketDataRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn count(&self, instrument: &str, timeframe: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM market_data WHERE instrument = ? AND timeframe = ?",
        )
        .bind(instrument)
        .bind(timeframe)
        .fetch_one(&self.database.pool)
        .await
        .context("Failed to count candles")?;
        Ok(count)
    }
}

#[async_trait]
impl MarketDataRepository for SqliteMarketDataRepository {
    async fn upsert_candles(
        &self,
        instrument: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Result<()> {
        let mut tx = self.database.pool.begin().await?;
        for candle in candles {
            sqlx::query(
                r#"
                INSERT INTO market_data (instrument, timeframe, timestamp, open, high, low, close, volume)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(instrument, timestamp, timeframe) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    volume = excluded.volume
                "#,
            )
            .bind(instrument)
            .bind(timeframe)
            .bind(timestamp(&candle.time))
            .bind(candle.open.to_string())
            .bind(candle.high.to_string())
            .bind(candle.low.to_string())
            .bind(candle.close.to_string())
            .bind(candle.volume)
            .execute(&mut *tx)
            .await
            .context("Failed to save candle")?;
        }
        tx.commit().await.context("Failed to commit candles")?;
        Ok(())
    }
}
