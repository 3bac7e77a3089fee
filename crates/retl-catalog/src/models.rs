use chrono::{DateTime, Utc};
use retl_core::ConnectorRole;
use serde::{Deserialize, Serialize};

/// Durable connector row. The configuration itself lives in the config cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorRecord {
    pub id: String,

    pub name: String,

    /// Adapter type (e.g., "postgres", "algolia")
    pub adapter_name: String,

    pub role: ConnectorRole,

    /// When this connector was registered
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ConnectorRecord {
    pub fn new(id: String, name: String, adapter_name: String, role: ConnectorRole) -> Self {
        Self {
            id,
            name,
            adapter_name,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Durable pipeline edge between two connector ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineRecord {
    pub id: String,

    /// Source connector id
    pub source: String,

    /// Destination connector id
    pub destination: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PipelineRecord {
    pub fn new(id: String, source: String, destination: String) -> Self {
        Self {
            id,
            source,
            destination,
            created_at: Utc::now(),
        }
    }
}
