use super::{
    parse_decimal, parse_json, parse_optional_decimal, parse_optional_timestamp, parse_timestamp,
    timestamp,
};
use crate::domain::recommendation::{AiRecommendation, DraftSource};
use crate::domain::repositories::RecommendationRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

pub struct SqliteAiRecommendationRepository {
    database: Database,
}

impl SqliteAiRecommendationRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn map_row(row: &SqliteRow) -> Result<AiRecommendation> {
        let direction: String = row.try_get("direction")?;
        let status: String = row.try_get("status")?;
        let source: String = row.try_get("source")?;
        let market: String = row.try_get("market_context")?;
        let news: String = row.try_get("news_context")?;
        let historical: String = row.try_get("historical_context")?;

        Ok(AiRecommendation {
            id: row.try_get("id")?,
            instrument: row.try_get("instrument")?,
            direction: direction.parse()?,
            units: parse_decimal(&row.try_get::<String, _>("units")?)?,
            confidence: row.try_get("confidence")?,
            rationale: row.try_get("rationale")?,
            stop_loss: parse_optional_decimal(row.try_get("stop_loss")?)?,
            take_profit: parse_optional_decimal(row.try_get("take_profit")?)?,
            expires_at: parse_timestamp(&row.try_get::<String, _>("expires_at")?)?,
            market_context: parse_json(&market),
            news_context: parse_json(&news),
            historical_context: parse_json(&historical),
            source: serde_json::from_str::<DraftSource>(&source)
                .context("Invalid draft source in database")?,
            status: status.parse()?,
            executed_trade_id: row.try_get("executed_trade_id")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
            deleted_at: parse_optional_timestamp(row.try_get("deleted_at")?)?,
        })
    }
}

#[async_trait]
impl RecommendationRepository<AiRecommendation> for SqliteAiRecommendationRepository {
    async fn create(&self, record: &AiRecommendation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ai_recommendations (
                id, instrument, direction, units, confidence, rationale,
                stop_loss, take_profit, expires_at,
                market_context, news_context, historical_context, source,
                status, executed_trade_id, created_at, updated_at, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.instrument)
        .bind(record.direction.as_str())
        .bind(record.units.to_string())
        .bind(record.confidence)
        .bind(&record.rationale)
        .bind(record.stop_loss.map(|p| p.to_string()))
        .bind(record.take_profit.map(|p| p.to_string()))
        .bind(timestamp(&record.expires_at))
        .bind(record.market_context.to_string())
        .bind(record.news_context.to_string())
        .bind(record.historical_context.to_string())
        .bind(serde_json::to_string(&record.source)?)
        .bind(record.status.as_str())
        .bind(&record.executed_trade_id)
        .bind(timestamp(&record.created_at))
        .bind(timestamp(&record.updated_at))
        .bind(record.deleted_at.as_ref().map(timestamp))
        .execute(&self.database.pool)
        .await
        .context("Failed to save AI recommendation")?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AiRecommendation>> {
        let row = sqlx::query("SELECT * FROM ai_recommendations WHERE id = ? AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.database.pool)
            .await
            .context("Failed to load AI recommendation")?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AiRecommendation>> {
        let rows = sqlx::query(
            "SELECT * FROM ai_recommendations WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to list AI recommendations")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn claim_pending(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ai_recommendations
            SET status = 'EXECUTED', updated_at = ?
            WHERE id = ? AND status = 'PENDING' AND deleted_at IS NULL
            "#,
        )
        .bind(timestamp(&Utc::now()))
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to claim AI recommendation")?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_claim(&self, id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE ai_recommendations
            SET status = 'PENDING', executed_trade_id = NULL, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(timestamp(&Utc::now()))
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to release AI recommendation claim")?;
        Ok(())
    }

    async fn mark_executed(&self, id: &str, trade_id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE ai_recommendations
            SET status = 'EXECUTED', executed_trade_id = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(trade_id)
        .bind(timestamp(&Utc::now()))
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to mark AI recommendation executed")?;
        if result.rows_affected() == 0 {
            anyhow::bail!("recommendation {} not found", id);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> Result<bool> {
        let now = timestamp(&Utc::now());
        let result = sqlx::query(
            "UPDATE ai_recommendations SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to delete AI recommendation")?;
        Ok(result.rows_affected() == 1)
    }
}
