use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A binding between one source connector and one destination connector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    pub id: String,

    /// Source connector id
    pub source: String,

    /// Destination connector id
    pub destination: String,
}

/// Counter row exposed next to pipeline listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineCount {
    pub id: String,

    /// "<source> -> <destination>"
    pub label: String,

    pub count: u64,
}

impl PipelineCount {
    pub fn for_pipeline(pipeline: &Pipeline, count: u64) -> Self {
        Self {
            id: pipeline.id.clone(),
            label: format!("{} -> {}", pipeline.source, pipeline.destination),
            count,
        }
    }
}

/// Process-lifetime launch counters keyed by pipeline id.
///
/// Every access takes the lock. Counts are never persisted.
#[derive(Debug, Clone, Default)]
pub struct PipelineCounters {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, pipeline_id: &str) -> u64 {
        let counts = self.counts.lock().await;
        counts.get(pipeline_id).copied().unwrap_or(0)
    }

    /// Increment and return the new value
    pub async fn increment(&self, pipeline_id: &str) -> u64 {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(pipeline_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}
