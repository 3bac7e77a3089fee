use async_trait::async_trait;
use retl_core::Result;
use std::collections::BTreeMap;

/// Everything a scheduler needs to start one execution unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionUnitSpec {
    /// Name prefix; the scheduler appends a uniqueness suffix
    pub generate_name: String,

    /// Name of the single container
    pub container_name: String,

    pub image: String,

    pub env: BTreeMap<String, String>,
}

/// A unit accepted by the scheduler. Nothing tracks it after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedUnit {
    /// Scheduler-assigned name
    pub name: String,
}

/// External compute scheduler
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Submit one unit. Failures surface as `Error::Scheduler` and are not retried.
    async fn submit(&self, spec: &ExecutionUnitSpec) -> Result<SubmittedUnit>;
}
