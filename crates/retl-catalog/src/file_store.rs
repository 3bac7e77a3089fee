use crate::backend::CatalogBackend;
use crate::models::{ConnectorRecord, PipelineRecord};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use retl_core::ConnectorRole;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const CONNECTORS_FILE: &str = "connectors.yaml";
const PIPELINES_FILE: &str = "pipelines.yaml";

#[derive(Debug, Default)]
struct FileState {
    connectors: Vec<ConnectorRecord>,
    pipelines: Vec<PipelineRecord>,
}

/// YAML-file catalog for single-node and development use
///
/// Every write rewrites the affected file under the storage directory.
#[derive(Debug)]
pub struct FileCatalog {
    state: Mutex<FileState>,
    storage_dir: PathBuf,
}

impl FileCatalog {
    /// Load the catalog from a storage directory, empty if nothing was saved yet
    pub fn load(storage_dir: impl AsRef<Path>) -> Result<Self> {
        let storage_dir = storage_dir.as_ref();

        let connectors = read_list(&storage_dir.join(CONNECTORS_FILE))?;
        let pipelines = read_list(&storage_dir.join(PIPELINES_FILE))?;

        Ok(Self {
            state: Mutex::new(FileState {
                connectors,
                pipelines,
            }),
            storage_dir: storage_dir.to_path_buf(),
        })
    }

    fn save<T: Serialize>(&self, file: &str, list: &[T]) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)
            .context("Failed to create storage directory")?;

        let yaml = serde_yaml::to_string(list)
            .with_context(|| format!("Failed to serialize {}", file))?;
        std::fs::write(self.storage_dir.join(file), yaml)
            .with_context(|| format!("Failed to write {}", file))?;

        Ok(())
    }
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let list: Option<Vec<T>> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(list.unwrap_or_default())
}

#[async_trait]
impl CatalogBackend for FileCatalog {
    async fn insert_connector(&self, record: &ConnectorRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.connectors.iter().any(|c| c.id == record.id) {
            return Err(anyhow!("Connector '{}' already exists", record.id));
        }

        state.connectors.push(record.clone());
        if let Err(e) = self.save(CONNECTORS_FILE, &state.connectors) {
            state.connectors.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn list_connectors(&self, role: ConnectorRole) -> Result<Vec<ConnectorRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .connectors
            .iter()
            .filter(|c| c.role == role)
            .cloned()
            .collect())
    }

    async fn insert_pipeline(&self, record: &PipelineRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.pipelines.iter().any(|p| p.id == record.id) {
            return Err(anyhow!("Pipeline '{}' already exists", record.id));
        }

        state.pipelines.push(record.clone());
        if let Err(e) = self.save(PIPELINES_FILE, &state.pipelines) {
            state.pipelines.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn list_pipelines(&self) -> Result<Vec<PipelineRecord>> {
        Ok(self.state.lock().await.pipelines.clone())
    }
}
