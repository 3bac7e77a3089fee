use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use retl_core::{
    normalize_row, Document, Error, Extractor, ExtractorFactory, ExtractorRuntime, Loader,
    LoaderFactory, LoaderRuntime, LoaderStatus, LogMessage, LogPublisher, LogSubscriber,
    LogTransport, MessageOutcome, Registry, Result, RunStats, RuntimeEnv, SourceValue,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MemoryLog {
    messages: Arc<Mutex<Vec<LogMessage>>>,
    fail_publish: bool,
}

struct MemoryPublisher {
    log: MemoryLog,
}

#[async_trait]
impl LogPublisher for MemoryPublisher {
    async fn publish(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.log.fail_publish {
            return Err(Error::Connection("broker unreachable".into()));
        }
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

struct RowsExtractor {
    rows: Vec<Document>,
}

#[async_trait]
impl Extractor for RowsExtractor {
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

#[derive(Clone, Default)]
struct MemorySink {
    documents: Arc<Mutex<HashMap<String, Document>>>,
    reject: Option<String>,
}

struct MemoryLoader {
    sink: MemorySink,
    status: LoaderStatus,
}

#[async_trait]
impl Loader for MemoryLoader {
    async fn connect(&mut self) -> Result<()> {
        self.status.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.status.connected = false;
        Ok(())
    }

    fn identity_field(&self) -> &str {
        "objectID"
    }

    async fn upsert(&mut self, id: &str, document: Document) -> Result<()> {
        if self.sink.reject.as_deref() == Some(id) {
            self.status.errors += 1;
            return Err(Error::DestinationWrite(format!("rejected {}", id)));
        }
        self.sink
            .documents
            .lock()
            .unwrap()
            .insert(id.to_string(), document);
        self.status.documents_written += 1;
        Ok(())
    }

    fn status(&self) -> LoaderStatus {
        self.status.clone()
    }
}

struct RowsFactory;

impl ExtractorFactory for RowsFactory {
    fn name(&self) -> &str {
        "rows"
    }

    fn create(&self, _env: &RuntimeEnv) -> Result<Box<dyn Extractor>> {
        let rows = (1..=3)
            .map(|i| {
                normalize_row(vec![
                    (Some("sku".to_string()), SourceValue::Int(i)),
                    (None, SourceValue::Text(format!("item {}", i))),
                ])
            })
            .collect();
        Ok(Box::new(RowsExtractor { rows }))
    }
}

struct SinkFactory {
    sink: MemorySink,
}

impl LoaderFactory for SinkFactory {
    fn name(&self) -> &str {
        "sink"
    }

    fn create(&self, _env: &RuntimeEnv) -> Result<Box<dyn Loader>> {
        Ok(Box::new(MemoryLoader {
            sink: self.sink.clone(),
            status: LoaderStatus::default(),
        }))
    }
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn raw(key: &str, offset: i64, value: &[u8]) -> LogMessage {
    LogMessage {
        key: Some(key.as_bytes().to_vec()),
        value: value.to_vec(),
        partition: 0,
        offset,
    }
}

#[tokio::test]
async fn test_extractor_publishes_every_row_keyed_by_pipeline() {
    let log = MemoryLog::default();
    let rows = vec![doc(json!({"a": 1})), doc(json!({"a": 2}))];

    let stats = ExtractorRuntime::new(
        "orders-to-search",
        Box::new(RowsExtractor { rows }),
        log.publisher().await.unwrap(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(stats.processed, 2);
    let messages = log.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.key_str() == "orders-to-search"));
    let first: Value = serde_json::from_slice(&messages[0].value).unwrap();
    assert_eq!(first, json!({"a": 1}));
}

#[tokio::test]
async fn test_empty_result_flows_through_both_units() {
    let log = MemoryLog::default();

    let stats = ExtractorRuntime::new(
        "p",
        Box::new(RowsExtractor { rows: Vec::new() }),
        log.publisher().await.unwrap(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(stats.processed, 0);
    assert!(log.messages.lock().unwrap().is_empty());

    // The loader side observes an empty log and stops cleanly
    let sink = MemorySink::default();
    let loader = MemoryLoader {
        sink: sink.clone(),
        status: LoaderStatus::default(),
    };
    let stats = LoaderRuntime::new(
        "p",
        Box::new(loader),
        log.subscriber("loader-p").await.unwrap(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(stats, RunStats::default());
    assert!(sink.documents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_fatal() {
    let log = MemoryLog {
        fail_publish: true,
        ..Default::default()
    };

    let result = ExtractorRuntime::new(
        "p",
        Box::new(RowsExtractor {
            rows: vec![doc(json!({"a": 1})), doc(json!({"a": 2}))],
        }),
        log.publisher().await.unwrap(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(Error::TransportFatal(_))));
}

#[tokio::test]
async fn test_loader_synthesizes_identity_from_key_and_offset() {
    let sink = MemorySink::default();
    let subscriber = MemorySubscriber {
        pending: VecDeque::from(vec![raw("p1", 7, br#"{"name":"a"}"#)]),
    };
    let loader = MemoryLoader {
        sink: sink.clone(),
        status: LoaderStatus::default(),
    };

    let stats = LoaderRuntime::new("p1", Box::new(loader), Box::new(subscriber))
        .run()
        .await
        .unwrap();

    assert_eq!(stats.written, 1);
    let documents = sink.documents.lock().unwrap();
    let stored = &documents["p1-7"];
    assert_eq!(stored["objectID"], "p1-7");
    assert_eq!(stored["name"], "a");
}

#[tokio::test]
async fn test_loader_skips_non_objects_and_survives_rejections() {
    let sink = MemorySink {
        reject: Some("bad".to_string()),
        ..Default::default()
    };
    let mut runtime = LoaderRuntime::new(
        "p",
        Box::new(MemoryLoader {
            sink: sink.clone(),
            status: LoaderStatus::default(),
        }),
        Box::new(MemorySubscriber {
            pending: VecDeque::new(),
        }),
    );

    assert_eq!(runtime.process(raw("p", 0, b"[1,2]")).await, MessageOutcome::Skipped);
    assert_eq!(runtime.process(raw("p", 1, b"not json")).await, MessageOutcome::Skipped);
    assert_eq!(
        runtime.process(raw("p", 2, br#"{"objectID":"bad"}"#)).await,
        MessageOutcome::Failed { id: "bad".to_string() }
    );
    assert_eq!(
        runtime.process(raw("p", 3, br#"{"objectID":"good"}"#)).await,
        MessageOutcome::Written { id: "good".to_string() }
    );

    let stats = runtime.stats();
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.written, 1);
    assert!(sink.documents.lock().unwrap().contains_key("good"));
}

#[tokio::test]
async fn test_redelivery_overwrites_same_identity() {
    let sink = MemorySink::default();
    let mut runtime = LoaderRuntime::new(
        "p",
        Box::new(MemoryLoader {
            sink: sink.clone(),
            status: LoaderStatus::default(),
        }),
        Box::new(MemorySubscriber {
            pending: VecDeque::new(),
        }),
    );

    runtime.process(raw("p", 5, br#"{"v":1}"#)).await;
    runtime.process(raw("p", 5, br#"{"v":1}"#)).await;

    assert_eq!(sink.documents.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_units_resolve_adapters_from_environment() {
    let log = MemoryLog::default();
    let sink = MemorySink::default();

    let mut registry = Registry::new();
    registry.register_extractor(Arc::new(RowsFactory));
    registry.register_loader(Arc::new(SinkFactory { sink: sink.clone() }));

    let source_env = RuntimeEnv::from_vars([("CONNECTOR_NAME", "rows"), ("PIPELINE_NAME", "p1")]);
    let published = retl_core::run_extractor(&source_env, &registry, &log)
        .await
        .unwrap();
    assert_eq!(published.processed, 3);

    let dest_env = RuntimeEnv::from_vars([("CONNECTOR_NAME", "sink"), ("PIPELINE_NAME", "p1")]);
    let loaded = retl_core::run_loader(&dest_env, &registry, &log).await.unwrap();
    assert_eq!(loaded.written, 3);

    let documents = sink.documents.lock().unwrap();
    assert_eq!(documents.len(), 3);
    assert_eq!(documents["p1-0"]["sku"], 1);
    assert_eq!(documents["p1-2"]["column_1"], "item 3");
}

#[tokio::test]
async fn test_unknown_adapter_fails_before_connecting() {
    let log = MemoryLog {
        fail_publish: true,
        ..Default::default()
    };
    let registry = Registry::new();
    let env = RuntimeEnv::from_vars([("CONNECTOR_NAME", "nope"), ("PIPELINE_NAME", "p")]);

    let result = retl_core::run_extractor(&env, &registry, &log).await;
    assert!(matches!(result, Err(Error::Configuration(_))));
}
