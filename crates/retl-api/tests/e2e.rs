//! Control plane to runtime: register, bind, launch, then run both units
//! against an in-process log.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::stream::{self, BoxStream, StreamExt};
use retl_api::{build_router, AppState};
use retl_catalog::{Catalog, FileCatalog, InMemoryConfigStore};
use retl_core::{
    normalize_row, run_extractor, run_loader, Document, Error, Extractor, ExtractorFactory,
    Loader, LoaderFactory, LoaderStatus, LogMessage, LogPublisher, LogSubscriber, LogTransport,
    Registry, Result, RuntimeEnv, SourceValue,
};
use retl_launcher::{ExecutionUnitSpec, ImageSet, Launcher, Scheduler, SubmittedUnit};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ========== Scheduler ==========

#[derive(Default)]
struct RecordingScheduler {
    submitted: Mutex<Vec<ExecutionUnitSpec>>,
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn submit(&self, spec: &ExecutionUnitSpec) -> Result<SubmittedUnit> {
        self.submitted.lock().unwrap().push(spec.clone());
        Ok(SubmittedUnit {
            name: format!("{}-abcde", spec.generate_name),
        })
    }
}

// ========== Log ==========

#[derive(Clone, Default)]
struct MemoryLog {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

struct MemoryPublisher {
    log: MemoryLog,
}

#[async_trait]
impl LogPublisher for MemoryPublisher {
    async fn publish(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut messages = self.log.messages.lock().unwrap();
        let offset = messages.len() as i64;
        messages.push(LogMessage {
            key: Some(key.as_bytes().to_vec()),
            value: value.to_vec(),
            partition: 0,
            offset,
        });
        Ok(())
    }
}

struct MemorySubscriber {
    pending: VecDeque<LogMessage>,
}

#[async_trait]
impl LogSubscriber for MemorySubscriber {
    async fn next(&mut self) -> Result<Option<LogMessage>> {
        Ok(self.pending.pop_front())
    }
}

#[async_trait]
impl LogTransport for MemoryLog {
    async fn publisher(&self) -> Result<Box<dyn LogPublisher>> {
        Ok(Box::new(MemoryPublisher { log: self.clone() }))
    }

    async fn subscriber(&self, _group_id: &str) -> Result<Box<dyn LogSubscriber>> {
        let pending = self.messages.lock().unwrap().iter().cloned().collect();
        Ok(Box::new(MemorySubscriber { pending }))
    }
}

// ========== Adapters ==========

#[derive(Deserialize)]
struct TableSettings {
    url: String,
    table: String,
    filter: String,
}

struct FixedTable {
    rows: Vec<Document>,
}

#[async_trait]
impl Extractor for FixedTable {
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn documents(&mut self) -> BoxStream<'_, Result<Document>> {
        stream::iter(self.rows.drain(..).map(Ok)).boxed()
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct FixedTableFactory;

impl ExtractorFactory for FixedTableFactory {
    fn name(&self) -> &str {
        "postgres"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Extractor>> {
        let settings: TableSettings = env.connector_section("POSTGRES")?;
        if settings.url.is_empty() || settings.table != "t" || settings.filter != "1=1" {
            return Err(Error::Configuration("unexpected source settings".into()));
        }
        let rows = ["red", "green", "blue"]
            .iter()
            .map(|colour| {
                normalize_row(vec![
                    (Some("colour".to_string()), SourceValue::Text(colour.to_string())),
                    (None, SourceValue::Bytes(colour.as_bytes().to_vec())),
                ])
            })
            .collect();
        Ok(Box::new(FixedTable { rows }))
    }
}

type Index = Arc<Mutex<HashMap<String, Document>>>;

struct IndexLoader {
    index: Index,
    status: LoaderStatus,
}

#[async_trait]
impl Loader for IndexLoader {
    async fn connect(&mut self) -> Result<()> {
        self.status.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    fn identity_field(&self) -> &str {
        "objectID"
    }

    async fn upsert(&mut self, id: &str, document: Document) -> Result<()> {
        self.index.lock().unwrap().insert(id.to_string(), document);
        self.status.documents_written += 1;
        Ok(())
    }

    fn status(&self) -> LoaderStatus {
        self.status.clone()
    }
}

struct IndexFactory {
    index: Index,
}

impl LoaderFactory for IndexFactory {
    fn name(&self) -> &str {
        "algolia"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Loader>> {
        env.require("ALGOLIA_INDEX")?;
        Ok(Box::new(IndexLoader {
            index: self.index.clone(),
            status: LoaderStatus::default(),
        }))
    }
}

// ========== Helpers ==========

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_three_rows_reach_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(
        Arc::new(FileCatalog::load(dir.path()).unwrap()),
        Arc::new(InMemoryConfigStore::new()),
    );
    let scheduler = Arc::new(RecordingScheduler::default());
    let launcher = Launcher::new(
        scheduler.clone(),
        ImageSet {
            source: "retl/extractor:test".to_string(),
            destination: "retl/loader:test".to_string(),
        },
    );
    let router = build_router(AppState::new(catalog, launcher), false);

    let (_, source) = post(
        &router,
        "/api/connectors",
        json!({
            "role": "source",
            "adapter_name": "postgres",
            "name": "orders",
            "config": {
                "settings": {"table": "t", "filter": "1=1"},
                "secrets": {"url": "postgres://db/shop"}
            }
        }),
    )
    .await;
    let (_, destination) = post(
        &router,
        "/api/connectors",
        json!({
            "role": "destination",
            "adapter_name": "algolia",
            "name": "search",
            "config": {
                "settings": {"ALGOLIA_INDEX": "orders"},
                "secrets": {"ALGOLIA_APP_ID": "APP", "ALGOLIA_API_KEY": "key"}
            }
        }),
    )
    .await;
    let source = source["id"].as_str().unwrap().to_string();
    let destination = destination["id"].as_str().unwrap().to_string();

    let (status, pipeline) = post(
        &router,
        "/api/pipelines",
        json!({"source_id": source, "destination_id": destination}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pipeline = pipeline["id"].as_str().unwrap().to_string();

    for (role, adapter, connector) in [
        ("source", "postgres", &source),
        ("destination", "algolia", &destination),
    ] {
        let (status, _) = post(
            &router,
            "/api/launch",
            json!({
                "pipeline_name": "orders-to-search",
                "role": role,
                "adapter_name": adapter,
                "connector_id": connector,
                "pipeline_id": pipeline
            }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let units = scheduler.submitted.lock().unwrap().clone();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].env["table"], "t");
    assert_eq!(units[0].env["filter"], "1=1");

    let index: Index = Arc::default();
    let mut registry = Registry::new();
    registry.register_extractor(Arc::new(FixedTableFactory));
    registry.register_loader(Arc::new(IndexFactory {
        index: index.clone(),
    }));
    let log = MemoryLog::default();

    let extracted = run_extractor(
        &RuntimeEnv::from_vars(units[0].env.clone()),
        &registry,
        &log,
    )
    .await
    .unwrap();
    assert_eq!(extracted.processed, 3);

    let loaded = run_loader(&RuntimeEnv::from_vars(units[1].env.clone()), &registry, &log)
        .await
        .unwrap();
    assert_eq!(loaded.written, 3);

    let index = index.lock().unwrap();
    let mut ids: Vec<_> = index.keys().cloned().collect();
    ids.sort();
    assert_eq!(
        ids,
        vec!["orders-to-search-0", "orders-to-search-1", "orders-to-search-2"]
    );
    assert_eq!(index["orders-to-search-1"]["colour"], "green");
    assert_eq!(index["orders-to-search-1"]["column_1"], "green");
    assert_eq!(index["orders-to-search-1"]["objectID"], "orders-to-search-1");
}
