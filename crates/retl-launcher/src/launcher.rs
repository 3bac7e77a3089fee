use crate::environment::build_environment;
use crate::naming::unit_name;
use crate::scheduler::{ExecutionUnitSpec, Scheduler, SubmittedUnit};
use retl_core::{ConnectorConfig, ConnectorRole, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Images run by execution units, one per role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSet {
    pub source: String,
    pub destination: String,
}

impl ImageSet {
    /// Adapter-specific behavior lives inside the image, so only the role matters
    pub fn image_for(&self, role: ConnectorRole) -> &str {
        match role {
            ConnectorRole::Source => &self.source,
            ConnectorRole::Destination => &self.destination,
        }
    }
}

/// One connector endpoint to start
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub pipeline_name: String,
    pub role: ConnectorRole,
    pub adapter_name: String,
    pub config: ConnectorConfig,
}

/// Turns connector configurations into execution units and submits them
#[derive(Clone)]
pub struct Launcher {
    scheduler: Arc<dyn Scheduler>,
    images: ImageSet,
}

impl Launcher {
    pub fn new(scheduler: Arc<dyn Scheduler>, images: ImageSet) -> Self {
        Self { scheduler, images }
    }

    /// Build the unit for a request without submitting it
    pub fn plan(&self, request: &LaunchRequest) -> Result<ExecutionUnitSpec> {
        let env = build_environment(
            &request.pipeline_name,
            &request.adapter_name,
            &request.config,
        )?;
        let name = unit_name(request.role, &request.adapter_name);

        Ok(ExecutionUnitSpec {
            generate_name: name.clone(),
            container_name: name,
            image: self.images.image_for(request.role).to_string(),
            env,
        })
    }

    /// Submit and detach. There is no supervision after this returns.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<SubmittedUnit> {
        let spec = self.plan(request)?;
        info!(
            "[{}] Launching {} unit {} ({} variables)",
            request.pipeline_name,
            request.role,
            spec.generate_name,
            spec.env.len()
        );
        self.scheduler.submit(&spec).await
    }
}
