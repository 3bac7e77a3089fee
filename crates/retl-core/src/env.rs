use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Adapter name injected into every execution unit
pub const CONNECTOR_NAME: &str = "CONNECTOR_NAME";

/// Pipeline name injected into every execution unit, used as the log message key
pub const PIPELINE_NAME: &str = "PIPELINE_NAME";

/// Snapshot of the environment an execution unit was started with.
///
/// Adapters never read the process environment directly; they get their
/// settings from this snapshot so runtimes can be driven in-process.
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnv {
    vars: HashMap<String, String>,
}

impl RuntimeEnv {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get a variable that must be present and non-empty
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Configuration(format!(
                "Missing environment variable {}",
                key
            ))),
        }
    }

    pub fn connector_name(&self) -> Result<&str> {
        self.require(CONNECTOR_NAME)
    }

    pub fn pipeline_name(&self) -> Result<&str> {
        self.require(PIPELINE_NAME)
    }

    /// Deserialize all variables starting with `<prefix>_` into `T`.
    ///
    /// The prefix is stripped and the remainder lowercased, so with prefix
    /// `POSTGRES` the variable `POSTGRES_TABLE` fills the field `table`.
    /// Values are kept as text (an app id `0123` must not become `123`).
    pub fn section<T: DeserializeOwned>(&self, prefix: &str) -> Result<T> {
        self.build_section(prefix, false)
    }

    /// Like [`section`](Self::section), but also read the bare lowercase keys
    /// a connector was registered with (`table` next to `POSTGRES_TABLE`).
    ///
    /// The prefixed variable wins when both are set.
    pub fn connector_section<T: DeserializeOwned>(&self, prefix: &str) -> Result<T> {
        self.build_section(prefix, true)
    }

    fn build_section<T: DeserializeOwned>(&self, prefix: &str, with_bare_keys: bool) -> Result<T> {
        let source: config::Map<String, String> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut builder = config::Config::builder();

        if with_bare_keys {
            let bare: config::Map<String, String> = self
                .vars
                .iter()
                .filter(|(k, _)| !k.is_empty() && !k.chars().any(|c| c.is_ascii_uppercase()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            builder = builder.add_source(config::Environment::default().source(Some(bare)));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .source(Some(source)),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
