use retl_core::{Result, RuntimeEnv};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shared log connection settings, read from the `LOG_*` variables of the unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerConfig {
    /// Bootstrap servers (`LOG_BROKERS`)
    #[serde(default = "default_brokers")]
    pub brokers: String,

    /// The one topic every pipeline shares (`LOG_TOPIC`)
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Client certificate (`LOG_CERT`)
    #[serde(default = "default_cert")]
    pub cert: PathBuf,

    /// Client private key (`LOG_KEY`)
    #[serde(default = "default_key")]
    pub key: PathBuf,

    /// CA bundle (`LOG_CA`)
    #[serde(default = "default_ca")]
    pub ca: PathBuf,

    /// Connection setup timeout (`LOG_DIAL_TIMEOUT_MS`)
    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,

    /// Delivery timeout of one publish (`LOG_MESSAGE_TIMEOUT_MS`)
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

fn default_brokers() -> String {
    "localhost:9093".to_string()
}

fn default_topic() -> String {
    "retl".to_string()
}

fn default_cert() -> PathBuf {
    PathBuf::from("service.cert")
}

fn default_key() -> PathBuf {
    PathBuf::from("service.key")
}

fn default_ca() -> PathBuf {
    PathBuf::from("ca.pem")
}

fn default_dial_timeout_ms() -> u64 {
    10_000
}

fn default_message_timeout_ms() -> u64 {
    5_000
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            topic: default_topic(),
            cert: default_cert(),
            key: default_key(),
            ca: default_ca(),
            dial_timeout_ms: default_dial_timeout_ms(),
            message_timeout_ms: default_message_timeout_ms(),
        }
    }
}

impl BrokerConfig {
    pub fn from_env(env: &RuntimeEnv) -> Result<Self> {
        env.section("LOG")
    }
}
