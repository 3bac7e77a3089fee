use crate::log::consumer_group_id;
use crate::{
    Document, Error, Extractor, Loader, LogMessage, LogPublisher, LogSubscriber, LogTransport,
    Registry, Result, RuntimeEnv,
};
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Counters reported by a finished runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rows published (extractor) or messages received (loader)
    pub processed: u64,
    /// Documents upserted
    pub written: u64,
    /// Messages that were not a JSON object
    pub skipped: u64,
    /// Upserts rejected by the destination
    pub failed: u64,
}

/// What happened to a single log message inside the loader loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Written { id: String },
    Skipped,
    Failed { id: String },
}

/// Source-side runtime: reads the result set once and publishes every row.
pub struct ExtractorRuntime {
    pipeline_name: String,
    extractor: Box<dyn Extractor>,
    publisher: Box<dyn LogPublisher>,
}

impl ExtractorRuntime {
    pub fn new(
        pipeline_name: impl Into<String>,
        extractor: Box<dyn Extractor>,
        publisher: Box<dyn LogPublisher>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            extractor,
            publisher,
        }
    }

    /// Run to completion. A read or publish failure aborts the run.
    pub async fn run(mut self) -> Result<RunStats> {
        info!("[{}] Opening source", self.pipeline_name);
        self.extractor.open().await?;

        let mut stats = RunStats::default();
        {
            let mut documents = self.extractor.documents();
            while let Some(document) = documents.next().await {
                let document = document?;
                let payload = serde_json::to_vec(&document)?;

                self.publisher
                    .publish(&self.pipeline_name, &payload)
                    .await
                    .map_err(|e| match e {
                        Error::TransportFatal(_) => e,
                        other => Error::TransportFatal(other.to_string()),
                    })?;

                stats.processed += 1;
                debug!("[{}] Published row {}", self.pipeline_name, stats.processed);
            }
        }

        self.extractor.close().await?;
        info!(
            "[{}] Source exhausted, published {} rows",
            self.pipeline_name, stats.processed
        );
        Ok(stats)
    }
}

/// Destination-side runtime: consumes the log forever and upserts each document.
pub struct LoaderRuntime {
    name: String,
    loader: Box<dyn Loader>,
    subscriber: Box<dyn LogSubscriber>,
    stats: RunStats,
}

impl LoaderRuntime {
    pub fn new(
        name: impl Into<String>,
        loader: Box<dyn Loader>,
        subscriber: Box<dyn LogSubscriber>,
    ) -> Self {
        Self {
            name: name.into(),
            loader,
            subscriber,
            stats: RunStats::default(),
        }
    }

    /// Consume until the log closes. Against a real broker this never returns
    /// unless reading from the log fails.
    pub async fn run(mut self) -> Result<RunStats> {
        self.loader.connect().await?;
        info!("[{}] Loader connected, consuming", self.name);

        loop {
            match self.subscriber.next().await {
                Ok(Some(message)) => {
                    self.process(message).await;
                }
                Ok(None) => {
                    warn!("[{}] Log closed", self.name);
                    break;
                }
                Err(e) => {
                    error!("[{}] Error reading from log: {}", self.name, e);
                    return Err(e);
                }
            }
        }

        self.loader.disconnect().await?;
        info!(
            "[{}] Loader stopped: {} received, {} written, {} skipped, {} failed",
            self.name,
            self.stats.processed,
            self.stats.written,
            self.stats.skipped,
            self.stats.failed
        );
        Ok(self.stats)
    }

    /// Handle one message. Never fails: bad payloads are skipped and rejected
    /// upserts are logged.
    pub async fn process(&mut self, message: LogMessage) -> MessageOutcome {
        self.stats.processed += 1;

        let mut document = match serde_json::from_slice::<Value>(&message.value) {
            Ok(Value::Object(document)) => document,
            Ok(other) => {
                warn!(
                    "[{}] Skipping offset {}: expected a JSON object, got {}",
                    self.name,
                    message.offset,
                    json_kind(&other)
                );
                self.stats.skipped += 1;
                return MessageOutcome::Skipped;
            }
            Err(e) => {
                warn!(
                    "[{}] Skipping offset {}: invalid JSON: {}",
                    self.name, message.offset, e
                );
                self.stats.skipped += 1;
                return MessageOutcome::Skipped;
            }
        };

        let field = self.loader.identity_field().to_string();
        let id = assign_identity(&mut document, &field, &message);

        match self.loader.upsert(&id, document).await {
            Ok(()) => {
                self.stats.written += 1;
                MessageOutcome::Written { id }
            }
            Err(e) => {
                error!("[{}] Failed to upsert '{}': {}", self.name, id, e);
                self.stats.failed += 1;
                MessageOutcome::Failed { id }
            }
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// Resolve the destination identity of a document.
///
/// An existing non-null identity field is used as is (strings verbatim,
/// anything else as compact JSON). Otherwise `<key>-<offset>` is synthesized
/// and written into the document, so redelivery of the same log position
/// overwrites instead of duplicating.
pub fn assign_identity(document: &mut Document, field: &str, message: &LogMessage) -> String {
    match document.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            let id = format!("{}-{}", message.key_str(), message.offset);
            document.insert(field.to_string(), Value::String(id.clone()));
            id
        }
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Entry point of a source execution unit.
///
/// Resolves the adapter from `CONNECTOR_NAME` before touching the network,
/// then connects to the log and runs the extractor to completion.
pub async fn run_extractor(
    env: &RuntimeEnv,
    registry: &Registry,
    transport: &dyn LogTransport,
) -> Result<RunStats> {
    let adapter = env.connector_name()?;
    let pipeline = env.pipeline_name()?;

    let factory = registry.get_extractor_factory(adapter)?;
    let extractor = factory.create(env)?;
    info!("[{}] Starting extractor '{}'", pipeline, adapter);

    let publisher = transport.publisher().await?;
    ExtractorRuntime::new(pipeline, extractor, publisher).run().await
}

/// Entry point of a destination execution unit.
pub async fn run_loader(
    env: &RuntimeEnv,
    registry: &Registry,
    transport: &dyn LogTransport,
) -> Result<RunStats> {
    let adapter = env.connector_name()?;
    let pipeline = env.pipeline_name()?;

    let factory = registry.get_loader_factory(adapter)?;
    let loader = factory.create(env)?;

    let group_id = consumer_group_id(adapter);
    info!(
        "[{}] Starting loader '{}' in group {}",
        pipeline, adapter, group_id
    );

    let subscriber = transport.subscriber(&group_id).await?;
    LoaderRuntime::new(pipeline, loader, subscriber).run().await
}
