use crate::scheduler::{ExecutionUnitSpec, Scheduler, SubmittedUnit};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, EnvVar, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use retl_core::{Error, Result};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Scheduler that runs every execution unit as a bare Pod
pub struct KubernetesScheduler {
    client: kube::Client,
    namespace: String,
}

impl KubernetesScheduler {
    pub fn new(client: kube::Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    /// Connect using the in-cluster config or the local kubeconfig
    pub async fn try_default(namespace: impl Into<String>) -> Result<Self> {
        let client = kube::Client::try_default()
            .await
            .map_err(|e| Error::Scheduler(format!("Failed to create Kubernetes client: {}", e)))?;

        Ok(Self::new(client, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Pod manifest for one unit. Pods are never restarted.
pub fn pod_manifest(spec: &ExecutionUnitSpec, namespace: &str) -> Pod {
    let env = spec
        .env
        .iter()
        .map(|(name, value)| EnvVar {
            name: name.clone(),
            value: Some(value.clone()),
            ..Default::default()
        })
        .collect();

    let labels = BTreeMap::from([
        ("app.kubernetes.io/managed-by".to_string(), "retl".to_string()),
        ("retl/unit".to_string(), spec.container_name.clone()),
    ]);

    Pod {
        metadata: ObjectMeta {
            generate_name: Some(format!("{}-", spec.generate_name)),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: spec.container_name.clone(),
                image: Some(spec.image.clone()),
                env: Some(env),
                ..Default::default()
            }],
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[async_trait]
impl Scheduler for KubernetesScheduler {
    async fn submit(&self, spec: &ExecutionUnitSpec) -> Result<SubmittedUnit> {
        let pod = pod_manifest(spec, &self.namespace);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);

        match api.create(&PostParams::default(), &pod).await {
            Ok(created) => {
                let name = created
                    .metadata
                    .name
                    .unwrap_or_else(|| spec.generate_name.clone());
                info!("Created pod {} in namespace {}", name, self.namespace);
                Ok(SubmittedUnit { name })
            }
            Err(e) => {
                error!("Failed to create pod for {}: {}", spec.generate_name, e);
                Err(Error::Scheduler(format!("Failed to create pod: {}", e)))
            }
        }
    }
}
