use super::{parse_json, parse_timestamp, timestamp};
use crate::domain::audit::{AuditEntity, AuditEntry};
use crate::domain::repositories::AuditRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

pub struct SqliteAuditRepository {
    database: Database,
}

impl SqliteAuditRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn map_row(row: &SqliteRow) -> Result<AuditEntry> {
        let entity: String = row.try_get("entity_type")?;
        let action: String = row.try_get("action")?;
        let details: String = row.try_get("details")?;

        Ok(AuditEntry {
            entity: entity.parse()?,
            entity_id: row.try_get("entity_id")?,
            action: action.parse()?,
            details: parse_json(&details),
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        })
    }
}

#[async_trait]
impl AuditRepository for SqliteAuditRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, details, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.entity.as_str())
        .bind(&entry.entity_id)
        .bind(entry.action.as_str())
        .bind(entry.details.to_string())
        .bind(timestamp(&entry.created_at))
        .execute(&self.database.pool)
        .await
        .context("Failed to append audit log")?;
        Ok(())
    }

    async fn list_for(&self, entity: AuditEntity, entity_id: &str) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM audit_logs WHERE entity_type = ? AND entity_id = ? ORDER BY id ASC",
        )
        .bind(entity.as_str())
        .bind(entity_id)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to load audit logs")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query("SELECT * FROM audit_logs ORDER BY id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.database.pool)
            .await
            .context("Failed to list audit logs")?;
        rows.iter().map(Self::map_row).collect()
    }
}
