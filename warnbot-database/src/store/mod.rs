mod memory_store;
mod postgres_store;
mod redis_store;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tracing::info;

pub use memory_store::MemoryWarnStore;
pub use postgres_store::PostgresWarnStore;
pub use redis_store::RedisWarnStore;

use crate::model::WarnRecord;

/// Name of the table (relational) or key namespace (document) holding warn counters.
pub const WARN_USERS: &str = "warn_users";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "warnbot:prod";

/// Per-user warning counter persistence.
///
/// Every backend must behave identically: counters start at 0, increment by
/// exactly one (creating the record on first use), and reset to 0 without
/// creating a record that does not exist yet. Each call borrows its own
/// connection from the backend pool.
pub trait WarnStore: Send + Sync {
    /// Create the backing table or collection if missing. Safe to call repeatedly.
    fn ensure_schema(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Add one warning to `jid`, creating the record at 1 if absent.
    fn increment_warn_count(&self, jid: &str) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Current warning count for `jid`, 0 when no record exists.
    fn warn_count(&self, jid: &str) -> impl Future<Output = anyhow::Result<u32>> + Send;

    /// Set the count for `jid` to 0. Returns whether a record existed.
    fn reset_warn_count(&self, jid: &str) -> impl Future<Output = anyhow::Result<bool>> + Send;

    fn find_record(
        &self,
        jid: &str,
    ) -> impl Future<Output = anyhow::Result<Option<WarnRecord>>> + Send;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    Postgres,
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!(
                "unknown warn store `{other}` (expected postgres, redis or memory)"
            )),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Redis => "redis",
            Self::Memory => "memory",
        })
    }
}

/// Connection settings used to build a [`WarnBackend`] at startup.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            redis_url: None,
            redis_key_prefix: DEFAULT_REDIS_KEY_PREFIX.to_owned(),
        }
    }
}

/// Backend selected by configuration, shared across command invocations.
#[derive(Clone, Debug)]
pub enum WarnBackend {
    Postgres(PostgresWarnStore),
    Redis(RedisWarnStore),
    Memory(MemoryWarnStore),
}

impl WarnBackend {
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let backend = match config.kind {
            StoreKind::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
                let store =
                    PostgresWarnStore::connect(database_url, config.max_connections).await?;
                info!("PostgreSQL connection established.");
                Self::Postgres(store)
            }
            StoreKind::Redis => {
                let redis_url = config
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("REDIS_URL is required for the redis store"))?;
                let store = RedisWarnStore::from_url(redis_url, config.redis_key_prefix.clone())?;
                info!(key_prefix = %config.redis_key_prefix, "Redis pool created.");
                Self::Redis(store)
            }
            StoreKind::Memory => {
                info!("Using in-memory warn store; counters will not survive a restart.");
                Self::Memory(MemoryWarnStore::new())
            }
        };

        Ok(backend)
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Postgres(_) => StoreKind::Postgres,
            Self::Redis(_) => StoreKind::Redis,
            Self::Memory(_) => StoreKind::Memory,
        }
    }

    /// Release pooled connections. Call once at shutdown.
    pub async fn close(&self) {
        match self {
            Self::Postgres(store) => store.close().await,
            Self::Redis(store) => store.close(),
            Self::Memory(_) => {}
        }
    }
}

impl WarnStore for WarnBackend {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.ensure_schema().await,
            Self::Redis(store) => store.ensure_schema().await,
            Self::Memory(store) => store.ensure_schema().await,
        }
    }

    async fn increment_warn_count(&self, jid: &str) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.increment_warn_count(jid).await,
            Self::Redis(store) => store.increment_warn_count(jid).await,
            Self::Memory(store) => store.increment_warn_count(jid).await,
        }
    }

    async fn warn_count(&self, jid: &str) -> anyhow::Result<u32> {
        match self {
            Self::Postgres(store) => store.warn_count(jid).await,
            Self::Redis(store) => store.warn_count(jid).await,
            Self::Memory(store) => store.warn_count(jid).await,
        }
    }

    async fn reset_warn_count(&self, jid: &str) -> anyhow::Result<bool> {
        match self {
            Self::Postgres(store) => store.reset_warn_count(jid).await,
            Self::Redis(store) => store.reset_warn_count(jid).await,
            Self::Memory(store) => store.reset_warn_count(jid).await,
        }
    }

    async fn find_record(&self, jid: &str) -> anyhow::Result<Option<WarnRecord>> {
        match self {
            Self::Postgres(store) => store.find_record(jid).await,
            Self::Redis(store) => store.find_record(jid).await,
            Self::Memory(store) => store.find_record(jid).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{StoreConfig, StoreKind, WarnBackend};

    #[test]
    fn parses_store_kinds() {
        assert_eq!("postgres".parse::<StoreKind>().unwrap(), StoreKind::Postgres);
        assert_eq!(" PG ".parse::<StoreKind>().unwrap(), StoreKind::Postgres);
        assert_eq!("Redis".parse::<StoreKind>().unwrap(), StoreKind::Redis);
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert!("mongodb".parse::<StoreKind>().is_err());
        assert!("".parse::<StoreKind>().is_err());
    }

    #[test]
    fn store_kind_display_round_trips() {
        for kind in [StoreKind::Postgres, StoreKind::Redis, StoreKind::Memory] {
            assert_eq!(kind.to_string().parse::<StoreKind>().unwrap(), kind);
        }
    }

    #[tokio::test]
    async fn missing_urls_are_rejected() {
        let postgres = StoreConfig::default();
        assert!(WarnBackend::connect(&postgres).await.is_err());

        let redis = StoreConfig {
            kind: StoreKind::Redis,
            ..StoreConfig::default()
        };
        assert!(WarnBackend::connect(&redis).await.is_err());
    }

    #[tokio::test]
    async fn memory_backend_dispatches() {
        let config = StoreConfig {
            kind: StoreKind::Memory,
            ..StoreConfig::default()
        };
        let backend = WarnBackend::connect(&config).await.unwrap();
        assert_eq!(backend.kind(), StoreKind::Memory);

        super::contract::assert_store_contract(&backend).await;
        backend.close().await;
    }
}
