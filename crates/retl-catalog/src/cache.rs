use async_trait::async_trait;
use retl_core::ConnectorConfig;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store of full connector configurations, keyed by connector id
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn put(&self, id: &str, config: ConnectorConfig);
    async fn get(&self, id: &str) -> Option<ConnectorConfig>;
    async fn contains(&self, id: &str) -> bool;
    async fn remove(&self, id: &str) -> Option<ConnectorConfig>;
}

/// Lock-guarded in-memory config cache. Lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<HashMap<String, ConnectorConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn put(&self, id: &str, config: ConnectorConfig) {
        self.entries.write().await.insert(id.to_string(), config);
    }

    async fn get(&self, id: &str) -> Option<ConnectorConfig> {
        self.entries.read().await.get(id).cloned()
    }

    async fn contains(&self, id: &str) -> bool {
        self.entries.read().await.contains_key(id)
    }

    async fn remove(&self, id: &str) -> Option<ConnectorConfig> {
        self.entries.write().await.remove(id)
    }
}
