use anyhow::anyhow;
use async_trait::async_trait;
use retl_catalog::{
    Catalog, CatalogBackend, ConfigStore, ConnectorRecord, FileCatalog, InMemoryConfigStore,
    PipelineRecord,
};
use retl_core::{ConnectorConfig, ConnectorRole, Error};
use serde_json::json;
use std::sync::Arc;

fn config(settings: serde_json::Value, secrets: serde_json::Value) -> ConnectorConfig {
    ConnectorConfig::new(
        settings.as_object().cloned().unwrap(),
        secrets.as_object().cloned().unwrap(),
    )
}

fn file_catalog(dir: &tempfile::TempDir) -> Catalog {
    Catalog::new(
        Arc::new(FileCatalog::load(dir.path()).unwrap()),
        Arc::new(InMemoryConfigStore::new()),
    )
}

#[tokio::test]
async fn test_registered_connector_is_listed_with_its_config() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);
    let cfg = config(
        json!({"POSTGRES_TABLE": "orders", "POSTGRES_FILTER": "1=1"}),
        json!({"POSTGRES_URL": "postgres://user:pw@db/shop"}),
    );

    let id = catalog
        .register_connector(ConnectorRole::Source, "postgres", "warehouse", cfg.clone())
        .await
        .unwrap();

    let sources = catalog.list_connectors(ConnectorRole::Source).await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, id);
    assert_eq!(sources[0].name, "warehouse");
    assert_eq!(sources[0].adapter_name, "postgres");
    assert_eq!(sources[0].config, Some(cfg));

    assert!(catalog
        .list_connectors(ConnectorRole::Destination)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_register_requires_name_and_adapter() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);

    let missing_name = catalog
        .register_connector(ConnectorRole::Source, "postgres", "", ConnectorConfig::default())
        .await;
    assert!(matches!(missing_name, Err(Error::Validation(_))));

    let missing_adapter = catalog
        .register_connector(ConnectorRole::Source, " ", "a", ConnectorConfig::default())
        .await;
    assert!(matches!(missing_adapter, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_connector_without_cached_config_lists_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);
    let id = catalog
        .register_connector(
            ConnectorRole::Destination,
            "algolia",
            "search",
            ConnectorConfig::default(),
        )
        .await
        .unwrap();

    catalog.config_store().remove(&id).await;

    let destinations = catalog
        .list_connectors(ConnectorRole::Destination)
        .await
        .unwrap();
    assert_eq!(destinations.len(), 1);
    assert!(destinations[0].config.is_none());
}

#[tokio::test]
async fn test_pipeline_visible_only_while_endpoints_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);

    let source = catalog
        .register_connector(ConnectorRole::Source, "postgres", "src", ConnectorConfig::default())
        .await
        .unwrap();
    let destination = catalog
        .register_connector(
            ConnectorRole::Destination,
            "algolia",
            "dst",
            ConnectorConfig::default(),
        )
        .await
        .unwrap();

    let id = catalog.bind_pipeline(&source, &destination).await.unwrap();

    let pipelines = catalog.list_pipelines().await.unwrap();
    assert_eq!(pipelines.len(), 1);
    assert_eq!(pipelines[0].id, id);
    assert_eq!(pipelines[0].source, source);
    assert_eq!(pipelines[0].destination, destination);

    catalog.config_store().remove(&source).await;
    assert!(catalog.list_pipelines().await.unwrap().is_empty());

    // The durable edge is still there
    let reloaded = FileCatalog::load(dir.path()).unwrap();
    assert_eq!(reloaded.list_pipelines().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bind_does_not_check_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);

    catalog.bind_pipeline("ghost-a", "ghost-b").await.unwrap();
    assert!(catalog.list_pipelines().await.unwrap().is_empty());

    let empty = catalog.bind_pipeline("", "ghost-b").await;
    assert!(matches!(empty, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_pipeline_counts_follow_counters() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = file_catalog(&dir);
    let source = catalog
        .register_connector(ConnectorRole::Source, "postgres", "src", ConnectorConfig::default())
        .await
        .unwrap();
    let destination = catalog
        .register_connector(
            ConnectorRole::Destination,
            "algolia",
            "dst",
            ConnectorConfig::default(),
        )
        .await
        .unwrap();
    let id = catalog.bind_pipeline(&source, &destination).await.unwrap();

    catalog.counters().increment(&id).await;
    catalog.counters().increment(&id).await;

    let counts = catalog.pipeline_counts().await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].id, id);
    assert_eq!(counts[0].count, 2);
    assert_eq!(counts[0].label, format!("{} -> {}", source, destination));
}

struct BrokenBackend;

#[async_trait]
impl CatalogBackend for BrokenBackend {
    async fn insert_connector(&self, _record: &ConnectorRecord) -> anyhow::Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn list_connectors(&self, _role: ConnectorRole) -> anyhow::Result<Vec<ConnectorRecord>> {
        Err(anyhow!("disk full"))
    }

    async fn insert_pipeline(&self, _record: &PipelineRecord) -> anyhow::Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn list_pipelines(&self) -> anyhow::Result<Vec<PipelineRecord>> {
        Err(anyhow!("disk full"))
    }
}

#[tokio::test]
async fn test_store_failure_keeps_cached_config() {
    let cache = Arc::new(InMemoryConfigStore::new());
    let catalog = Catalog::new(Arc::new(BrokenBackend), cache.clone());

    let result = catalog
        .register_connector(
            ConnectorRole::Source,
            "postgres",
            "src",
            config(json!({"POSTGRES_TABLE": "t"}), json!({})),
        )
        .await;
    assert!(matches!(result, Err(Error::Store(_))));

    // Cache write happened first and is not rolled back
    assert_eq!(cache.len().await, 1);

    assert!(matches!(catalog.list_pipelines().await, Err(Error::Store(_))));
}
