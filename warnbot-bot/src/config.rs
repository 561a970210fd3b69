use std::env;

use anyhow::Context as _;

use warnbot_database::store::{DEFAULT_MAX_CONNECTIONS, DEFAULT_REDIS_KEY_PREFIX};
use warnbot_database::{StoreConfig, StoreKind};

/// Startup settings read from the environment.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: String,
    pub store: StoreConfig,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;

        let kind = match lookup("WARN_STORE") {
            Some(raw) => raw.parse::<StoreKind>()?,
            None => StoreKind::default(),
        };

        let store = StoreConfig {
            kind,
            database_url: non_empty(lookup("DATABASE_URL")),
            max_connections: env_u32(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            redis_url: non_empty(lookup("REDIS_URL")),
            redis_key_prefix: non_empty(lookup("REDIS_KEY_PREFIX"))
                .unwrap_or_else(|| DEFAULT_REDIS_KEY_PREFIX.to_owned()),
        };

        Ok(Self { token, store })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn env_u32<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use warnbot_database::StoreKind;

    use super::BotConfig;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_postgres() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://localhost/warnbot"),
        ]))
        .unwrap();

        assert_eq!(config.token, "token");
        assert_eq!(config.store.kind, StoreKind::Postgres);
        assert_eq!(
            config.store.database_url.as_deref(),
            Some("postgres://localhost/warnbot")
        );
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.store.redis_key_prefix, "warnbot:prod");
    }

    #[test]
    fn reads_redis_settings() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("WARN_STORE", "redis"),
            ("REDIS_URL", "redis://127.0.0.1/"),
            ("REDIS_KEY_PREFIX", "warnbot:dev"),
            ("DATABASE_MAX_CONNECTIONS", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.store.kind, StoreKind::Redis);
        assert_eq!(config.store.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.store.redis_key_prefix, "warnbot:dev");
        assert_eq!(config.store.max_connections, 5);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "  "),
            ("REDIS_KEY_PREFIX", ""),
        ]))
        .unwrap();

        assert_eq!(config.store.database_url, None);
        assert_eq!(config.store.redis_key_prefix, "warnbot:prod");
    }

    #[test]
    fn rejects_missing_token_and_unknown_store() {
        assert!(BotConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(
            BotConfig::from_lookup(lookup_from(&[
                ("DISCORD_TOKEN", "token"),
                ("WARN_STORE", "mongodb"),
            ]))
            .is_err()
        );
    }
}
