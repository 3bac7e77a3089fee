use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Side of a pipeline a connector is bound to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorRole {
    #[serde(alias = "Source", alias = "input", alias = "Input")]
    Source,
    #[serde(alias = "Destination", alias = "output", alias = "Output")]
    Destination,
}

impl ConnectorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorRole::Source => "source",
            ConnectorRole::Destination => "destination",
        }
    }
}

impl fmt::Display for ConnectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" | "input" => Ok(ConnectorRole::Source),
            "destination" | "output" => Ok(ConnectorRole::Destination),
            other => Err(Error::Validation(format!(
                "Unknown connector role '{}' (expected 'source' or 'destination')",
                other
            ))),
        }
    }
}

/// Full connector configuration as supplied at registration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorConfig {
    /// Non-sensitive adapter settings (table, filter, index, ...)
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Credentials and other sensitive values
    #[serde(default)]
    pub secrets: Map<String, Value>,
}

impl ConnectorConfig {
    pub fn new(settings: Map<String, Value>, secrets: Map<String, Value>) -> Self {
        Self { settings, secrets }
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty() && self.secrets.is_empty()
    }
}

/// A registered connector joined with its cached configuration.
///
/// `config` is `None` when the configuration cache has no entry for the id,
/// e.g. after the control plane restarted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub adapter_name: String,
    pub role: ConnectorRole,
    pub config: Option<ConnectorConfig>,
}
