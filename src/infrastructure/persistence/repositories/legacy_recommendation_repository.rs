use super::{parse_decimal, parse_json, parse_optional_timestamp, parse_timestamp, timestamp};
use crate::domain::recommendation::LegacyRecommendation;
use crate::domain::repositories::RecommendationRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// The lean `recommendations` table read by older consumers
pub struct SqliteLegacyRecommendationRepository {
    database: Database,
}

impl SqliteLegacyRecommendationRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn map_row(row: &SqliteRow) -> Result<LegacyRecommendation> {
        let direction: String = row.try_get("direction")?;
        let status: String = row.try_get("status")?;
        let market: String = row.try_get("market_conditions")?;

        Ok(LegacyRecommendation {
            id: row.try_get("id")?,
            instrument: row.try_get("instrument")?,
            direction: direction.parse()?,
            units: parse_decimal(&row.try_get::<String, _>("units")?)?,
            rationale: row.try_get("rationale")?,
            confidence: row.try_get("confidence")?,
            market_conditions: parse_json(&market),
            status: status.parse()?,
            trade_id: row.try_get("trade_id")?,
            mirror_of: row.try_get("mirror_of")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            executed_at: parse_optional_timestamp(row.try_get("executed_at")?)?,
            deleted_at: parse_optional_timestamp(row.try_get("deleted_at")?)?,
        })
    }
}

#[async_trait]
impl RecommendationRepository<LegacyRecommendation> for SqliteLegacyRecommendationRepository {
    async fn create(&self, record: &LegacyRecommendation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recommendations (
                id, instrument, direction, units, rationale, confidence,
                market_conditions, status, trade_id, mirror_of,
                created_at, executed_at, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.instrument)
        .bind(record.direction.as_str())
        .bind(record.units.to_string())
        .bind(&record.rationale)
        .bind(record.confidence)
        .bind(record.market_conditions.to_string())
        .bind(record.status.as_str())
        .bind(&record.trade_id)
        .bind(&record.mirror_of)
        .bind(timestamp(&record.created_at))
        .bind(record.executed_at.as_ref().map(timestamp))
        .bind(record.deleted_at.as_ref().map(timestamp))
        .execute(&self.database.pool)
        .await
        .context("Failed to save recommendation")?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LegacyRecommendation>> {
        let row = sqlx::query("SELECT * FROM recommendations WHERE id = ? AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.database.pool)
            .await
            .context("Failed to load recommendation")?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LegacyRecommendation>> {
        let rows = sqlx::query(
            "SELECT * FROM recommendations WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to list recommendations")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn claim_pending(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recommendations
            SET status = 'EXECUTED'
            WHERE id = ? AND status = 'PENDING' AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to claim recommendation")?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_claim(&self, id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE recommendations
            SET status = 'PENDING', trade_id = NULL, executed_at = NULL
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to release recommendation claim")?;
        Ok(())
    }

    async fn mark_executed(&self, id: &str, trade_id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE recommendations
            SET status = 'EXECUTED', trade_id = ?, executed_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(trade_id)
        .bind(timestamp(&Utc::now()))
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to mark recommendation executed")?;
        if result.rows_affected() == 0 {
            anyhow::bail!("recommendation {} not found", id);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE recommendations SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(timestamp(&Utc::now()))
        .bind(id)
        .execute(&self.database.pool)
        .await
        .context("Failed to delete recommendation")?;
        Ok(result.rows_affected() == 1)
    }
}
