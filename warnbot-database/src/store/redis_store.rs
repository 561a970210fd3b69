use std::collections::HashMap;

use anyhow::Context as _;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use super::{WARN_USERS, WarnStore};
use crate::model::WarnRecord;

const JID_FIELD: &str = "jid";
const WARN_COUNT_FIELD: &str = "warn_count";

/// Zero the counter only when the user document already exists.
const RESET_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], 0)
    return 1
end
return 0
";

/// Document backend: one hash per user holding `jid` and `warn_count`.
#[derive(Clone, Debug)]
pub struct RedisWarnStore {
    pool: Pool,
    key_prefix: String,
}

impl RedisWarnStore {
    pub fn from_url(redis_url: &str, key_prefix: impl Into<String>) -> anyhow::Result<Self> {
        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| anyhow::anyhow!("failed to create redis pool: {e}"))?;

        Ok(Self {
            pool,
            key_prefix: key_prefix.into(),
        })
    }

    /// Key of the document stored for `jid`.
    pub fn key(&self, jid: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, WARN_USERS, jid)
    }

    pub fn close(&self) {
        self.pool.close();
    }

    async fn connection(&self) -> anyhow::Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("failed to get redis connection: {e}"))
    }
}

impl WarnStore for RedisWarnStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        let mut conn = self.connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("redis PING failed: {e}"))?;

        Ok(())
    }

    async fn increment_warn_count(&self, jid: &str) -> anyhow::Result<()> {
        let key = self.key(jid);
        let mut conn = self.connection().await?;

        let (warn_count,): (i64,) = redis::pipe()
            .atomic()
            .hset(&key, JID_FIELD, jid)
            .ignore()
            .hincr(&key, WARN_COUNT_FIELD, 1)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("redis HINCRBY failed for key `{key}`: {e}"))?;

        debug!(jid, warn_count, "warn count incremented");
        Ok(())
    }

    async fn warn_count(&self, jid: &str) -> anyhow::Result<u32> {
        let key = self.key(jid);
        let mut conn = self.connection().await?;

        let value = conn
            .hget::<_, _, Option<i64>>(&key, WARN_COUNT_FIELD)
            .await
            .map_err(|e| anyhow::anyhow!("redis HGET failed for key `{key}`: {e}"))?;

        match value {
            Some(count) => u32::try_from(count).context("warn_count out of u32 range"),
            None => Ok(0),
        }
    }

    async fn reset_warn_count(&self, jid: &str) -> anyhow::Result<bool> {
        let key = self.key(jid);
        let mut conn = self.connection().await?;

        let existed: i64 = redis::Script::new(RESET_IF_EXISTS)
            .key(&key)
            .arg(WARN_COUNT_FIELD)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("redis reset script failed for key `{key}`: {e}"))?;

        Ok(existed == 1)
    }

    async fn find_record(&self, jid: &str) -> anyhow::Result<Option<WarnRecord>> {
        let key = self.key(jid);
        let mut conn = self.connection().await?;

        let fields = conn
            .hgetall::<_, HashMap<String, String>>(&key)
            .await
            .map_err(|e| anyhow::anyhow!("redis HGETALL failed for key `{key}`: {e}"))?;

        if fields.is_empty() {
            return Ok(None);
        }

        let warn_count = match fields.get(WARN_COUNT_FIELD) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid warn_count `{raw}` for key `{key}`"))?,
            None => 0,
        };

        Ok(Some(WarnRecord {
            jid: fields
                .get(JID_FIELD)
                .cloned()
                .unwrap_or_else(|| jid.to_owned()),
            warn_count,
        }))
    }
}
