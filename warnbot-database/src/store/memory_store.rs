use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::WarnStore;
use crate::model::WarnRecord;

/// Process-local store. Counters are lost when the process exits.
#[derive(Clone, Debug, Default)]
pub struct MemoryWarnStore {
    records: Arc<RwLock<HashMap<String, u32>>>,
}

impl MemoryWarnStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WarnStore for MemoryWarnStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn increment_warn_count(&self, jid: &str) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        let count = records.entry(jid.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
        Ok(())
    }

    async fn warn_count(&self, jid: &str) -> anyhow::Result<u32> {
        Ok(self.records.read().await.get(jid).copied().unwrap_or(0))
    }

    async fn reset_warn_count(&self, jid: &str) -> anyhow::Result<bool> {
        match self.records.write().await.get_mut(jid) {
            Some(count) => {
                *count = 0;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_record(&self, jid: &str) -> anyhow::Result<Option<WarnRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(jid)
            .map(|&warn_count| WarnRecord {
                jid: jid.to_owned(),
                warn_count,
            }))
    }
}
