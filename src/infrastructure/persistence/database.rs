use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared SQLite pool plus schema bootstrap
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

fn is_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        let memory = is_memory(db_url);

        // Ensure the directory exists if it's a file path
        if !memory && let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part.split('?').next().unwrap_or(path_part));
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let mut options = SqliteConnectOptions::from_str(db_url)
            .with_context(|| format!("Invalid DATABASE_URL: {}", db_url))?
            .create_if_missing(true);
        if !memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every pooled connection to :memory: would see its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(if memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Round-trip a trivial query
    pub async fn health(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ai_recommendations (
                id TEXT PRIMARY KEY,
                instrument TEXT NOT NULL,
                direction TEXT NOT NULL,
                units TEXT NOT NULL,
                confidence REAL NOT NULL,
                rationale TEXT NOT NULL,
                stop_loss TEXT,
                take_profit TEXT,
                expires_at TEXT NOT NULL,
                market_context TEXT NOT NULL,
                news_context TEXT NOT NULL,
                historical_context TEXT NOT NULL,
                source TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                executed_trade_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_ai_recommendations_created
            ON ai_recommendations (created_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create ai_recommendations table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recommendations (
                id TEXT PRIMARY KEY,
                instrument TEXT NOT NULL,
                direction TEXT NOT NULL,
                units TEXT NOT NULL,
                rationale TEXT,
                confidence REAL,
                market_conditions TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                trade_id TEXT,
                mirror_of TEXT,
                created_at TEXT NOT NULL,
                executed_at TEXT,
                deleted_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_recommendations_created
            ON recommendations (created_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create recommendations table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                instrument TEXT NOT NULL,
                direction TEXT NOT NULL,
                units TEXT NOT NULL,
                entry_price TEXT,
                exit_price TEXT,
                profit_loss TEXT,
                commission TEXT,
                swap TEXT,
                status TEXT NOT NULL,
                broker_trade_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                closed_at TEXT,
                deleted_at TEXT
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create trades table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                action TEXT NOT NULL,
                details TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_logs_entity
            ON audit_logs (entity_type, entity_id);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create audit_logs table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS market_data (
                instrument TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                open TEXT NOT NULL,
                high TEXT NOT NULL,
                low TEXT NOT NULL,
                close TEXT NOT NULL,
                volume INTEGER NOT NULL,
                UNIQUE (instrument, timestamp, timeframe)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create market_data table")?;

        info!("Database schema initialized.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_urls() {
        assert!(is_memory("sqlite::memory:"));
        assert!(is_memory("sqlite://file:fx?mode=memory&cache=shared"));
        assert!(!is_memory("sqlite://data/fxdesk.db"));
    }

    #[tokio::test]
    async fn test_in_memory_database_initializes() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.health().await.unwrap();
        // init is idempotent
        db.init().await.unwrap();
    }
}
