use super::{parse_decimal, parse_optional_decimal, parse_optional_timestamp, parse_timestamp, timestamp};
use crate::domain::repositories::TradeRepository;
use crate::domain::trading::trade::Trade;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::info;

pub struct SqliteTradeRepository {
    database: Database,
}

impl SqliteTradeRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn map_row(row: &SqliteRow) -> Result<Trade> {
        let direction: String = row.try_get("direction")?;
        let status: String = row.try_get("status")?;

        Ok(Trade {
            id: row.try_get("id")?,
            instrument: row.try_get("instrument")?,
            direction: direction.parse()?,
            units: parse_decimal(&row.try_get::<String, _>("units")?)?,
            entry_price: parse_optional_decimal(row.try_get("entry_price")?)?,
            exit_price: parse_optional_decimal(row.try_get("exit_price")?)?,
            profit_loss: parse_optional_decimal(row.try_get("profit_loss")?)?,
            commission: parse_optional_decimal(row.try_get("commission")?)?,
            swap: parse_optional_decimal(row.try_get("swap")?)?,
            status: status.parse()?,
            broker_trade_id: row.try_get("broker_trade_id")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
            closed_at: parse_optional_timestamp(row.try_get("closed_at")?)?,
        })
    }
}

fn optional_text(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}

#[async_trait]
impl TradeRepository for SqliteTradeRepository {
    async fn create(&self, trade: &Trade) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trades (
                id, instrument, direction, units, entry_price, exit_price,
                profit_loss, commission, swap, status, broker_trade_id,
                created_at, updated_at, closed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trade.id)
        .bind(&trade.instrument)
        .bind(trade.direction.as_str())
        .bind(trade.units.to_string())
        .bind(optional_text(trade.entry_price))
        .bind(optional_text(trade.exit_price))
        .bind(optional_text(trade.profit_loss))
        .bind(optional_text(trade.commission))
        .bind(optional_text(trade.swap))
        .bind(trade.status.as_str())
        .bind(&trade.broker_trade_id)
        .bind(timestamp(&trade.created_at))
        .bind(timestamp(&trade.updated_at))
        .bind(trade.closed_at.as_ref().map(timestamp))
        .execute(&self.database.pool)
        .await
        .context("Failed to save trade")?;

        info!("Persisted Trade {}", trade.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Trade>> {
        let row = sqlx::query("SELECT * FROM trades WHERE id = ? AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.database.pool)
            .await
            .context("Failed to load trade")?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Trade>> {
        let rows = sqlx::query(
            "SELECT * FROM trades WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to list trades")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn soft_delete(&self, id: &str) -> Result<bool> {
        let now = timestamp(&Utc::now());
        let result = sqlx::query(
            "UPDATE trades SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to delete trade")?;
        Ok(result.rows_affected() == 1)
    }
}
