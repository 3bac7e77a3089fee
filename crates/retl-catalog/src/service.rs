use crate::backend::CatalogBackend;
use crate::cache::ConfigStore;
use crate::models::{ConnectorRecord, PipelineRecord};
use retl_core::{
    Connector, ConnectorConfig, ConnectorRole, Error, Pipeline, PipelineCount, PipelineCounters,
    Result,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Connector and pipeline catalog: durable metadata joined with the config cache
#[derive(Clone)]
pub struct Catalog {
    backend: Arc<dyn CatalogBackend>,
    cache: Arc<dyn ConfigStore>,
    counters: PipelineCounters,
}

impl Catalog {
    pub fn new(backend: Arc<dyn CatalogBackend>, cache: Arc<dyn ConfigStore>) -> Self {
        Self {
            backend,
            cache,
            counters: PipelineCounters::default(),
        }
    }

    pub fn config_store(&self) -> Arc<dyn ConfigStore> {
        self.cache.clone()
    }

    pub fn counters(&self) -> &PipelineCounters {
        &self.counters
    }

    // ========== Connector Management ==========

    /// Register a connector and return its new id.
    ///
    /// The config is cached before the durable row is written and is not
    /// removed again when that write fails.
    pub async fn register_connector(
        &self,
        role: ConnectorRole,
        adapter_name: &str,
        name: &str,
        config: ConnectorConfig,
    ) -> Result<String> {
        if name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if adapter_name.trim().is_empty() {
            return Err(Error::Validation("adapter_name is required".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        self.cache.put(&id, config).await;

        let record = ConnectorRecord::new(
            id.clone(),
            name.to_string(),
            adapter_name.to_string(),
            role,
        );
        self.backend
            .insert_connector(&record)
            .await
            .map_err(|e| Error::Store(format!("{:#}", e)))?;

        info!("Registered {} connector '{}' ({}) as {}", role, name, adapter_name, id);
        Ok(id)
    }

    /// List connectors of one role. Connectors without a cached config are
    /// returned with `config: None`.
    pub async fn list_connectors(&self, role: ConnectorRole) -> Result<Vec<Connector>> {
        let records = self
            .backend
            .list_connectors(role)
            .await
            .map_err(|e| Error::Store(format!("{:#}", e)))?;

        let mut connectors = Vec::with_capacity(records.len());
        for record in records {
            let config = self.cache.get(&record.id).await;
            connectors.push(Connector {
                id: record.id,
                name: record.name,
                adapter_name: record.adapter_name,
                role: record.role,
                config,
            });
        }
        Ok(connectors)
    }

    /// Cached configuration of a connector
    pub async fn connector_config(&self, id: &str) -> Option<ConnectorConfig> {
        self.cache.get(id).await
    }

    // ========== Pipeline Management ==========

    /// Bind a source and a destination connector. Endpoint existence is not checked.
    pub async fn bind_pipeline(&self, source: &str, destination: &str) -> Result<String> {
        if source.trim().is_empty() || destination.trim().is_empty() {
            return Err(Error::Validation(
                "source and destination ids are required".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let record = PipelineRecord::new(id.clone(), source.to_string(), destination.to_string());
        self.backend
            .insert_pipeline(&record)
            .await
            .map_err(|e| Error::Store(format!("{:#}", e)))?;

        info!("Bound pipeline {}: {} -> {}", id, source, destination);
        Ok(id)
    }

    /// List the pipelines whose both endpoints resolve in the config cache
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let records = self
            .backend
            .list_pipelines()
            .await
            .map_err(|e| Error::Store(format!("{:#}", e)))?;

        let mut pipelines = Vec::with_capacity(records.len());
        for record in records {
            if !self.cache.contains(&record.source).await
                || !self.cache.contains(&record.destination).await
            {
                warn!(
                    "Hiding pipeline {}: endpoint {} or {} has no cached config",
                    record.id, record.source, record.destination
                );
                continue;
            }
            pipelines.push(Pipeline {
                id: record.id,
                source: record.source,
                destination: record.destination,
            });
        }
        Ok(pipelines)
    }

    /// Launch counters of every visible pipeline
    pub async fn pipeline_counts(&self) -> Result<Vec<PipelineCount>> {
        let mut counts = Vec::new();
        for pipeline in self.list_pipelines().await? {
            let count = self.counters.get(&pipeline.id).await;
            counts.push(PipelineCount::for_pipeline(&pipeline, count));
        }
        Ok(counts)
    }
}
