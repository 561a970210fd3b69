use anyhow::Context as _;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use super::WarnStore;
use crate::model::WarnRecord;

#[derive(sqlx::FromRow)]
struct WarnUserRow {
    jid: String,
    warn_count: i32,
}

impl TryFrom<WarnUserRow> for WarnRecord {
    type Error = anyhow::Error;

    fn try_from(row: WarnUserRow) -> anyhow::Result<Self> {
        Ok(Self {
            warn_count: u32::try_from(row.warn_count).context("warn_count row out of u32 range")?,
            jid: row.jid,
        })
    }
}

/// Relational backend over the `warn_users` table.
#[derive(Clone, Debug)]
pub struct PostgresWarnStore {
    pool: PgPool,
}

impl PostgresWarnStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to postgres")?;

        Ok(Self { pool })
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl WarnStore for PostgresWarnStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS warn_users (
                jid TEXT PRIMARY KEY,
                warn_count INTEGER NOT NULL DEFAULT 0 CHECK (warn_count >= 0)
            )",
        )
        .execute(&self.pool)
        .await
        .context("failed to create warn_users table")?;

        Ok(())
    }

    async fn increment_warn_count(&self, jid: &str) -> anyhow::Result<()> {
        let warn_count: i32 = sqlx::query_scalar(
            "INSERT INTO warn_users (jid, warn_count)
             VALUES ($1, 1)
             ON CONFLICT (jid) DO UPDATE SET warn_count = warn_users.warn_count + 1
             RETURNING warn_count",
        )
        .bind(jid)
        .fetch_one(&self.pool)
        .await?;

        debug!(jid, warn_count, "warn count incremented");
        Ok(())
    }

    async fn warn_count(&self, jid: &str) -> anyhow::Result<u32> {
        let warn_count: Option<i32> =
            sqlx::query_scalar("SELECT warn_count FROM warn_users WHERE jid = $1")
                .bind(jid)
                .fetch_optional(&self.pool)
                .await?;

        match warn_count {
            Some(count) => u32::try_from(count).context("warn_count out of u32 range"),
            None => Ok(0),
        }
    }

    async fn reset_warn_count(&self, jid: &str) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE warn_users SET warn_count = 0 WHERE jid = $1")
            .bind(jid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn find_record(&self, jid: &str) -> anyhow::Result<Option<WarnRecord>> {
        let row: Option<WarnUserRow> =
            sqlx::query_as("SELECT jid, warn_count FROM warn_users WHERE jid = $1")
                .bind(jid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(WarnRecord::try_from).transpose()
    }
}
