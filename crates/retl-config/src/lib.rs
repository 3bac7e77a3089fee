use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Control-plane configuration (API server, catalog, launcher)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,

    /// Enable CORS (allow-all)
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON formatted logs
    pub json: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackendKind {
    Postgres,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Durable catalog backend
    pub backend: CatalogBackendKind,

    /// PostgreSQL connection string, used by the postgres backend
    pub database_url: Option<String>,

    /// Directory of the YAML files, used by the file backend
    pub storage_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Kubernetes namespace execution units are created in
    pub namespace: String,

    /// Image run by every source unit
    pub source_image: String,

    /// Image run by every destination unit
    pub destination_image: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            catalog: CatalogConfig {
                backend: CatalogBackendKind::File,
                database_url: None,
                storage_dir: PathBuf::from("./data"),
            },
            launcher: LauncherConfig {
                namespace: "default".to_string(),
                source_image: "retl/extractor:latest".to_string(),
                destination_image: "retl/loader:latest".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load(config_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_dir = config_dir.as_ref();
        let s = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::with_name(&config_dir.join("default.yaml").to_string_lossy())
                    .required(false),
            )
            // Container overrides
            .add_source(
                config::File::with_name(&config_dir.join("docker.yaml").to_string_lossy())
                    .required(false),
            )
            // Environment variables (RETL_API__PORT=4000)
            .add_source(
                config::Environment::with_prefix("RETL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config = s.try_deserialize()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
