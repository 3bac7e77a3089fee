use retl_core::{ConnectorConfig, Error, Result, CONNECTOR_NAME, PIPELINE_NAME};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Render one config value as environment-variable text.
///
/// Strings are used verbatim, `null` is empty, scalars use their JSON text,
/// arrays and objects become compact JSON with object keys sorted.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        structured => canonical(structured).to_string(),
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical(v))).collect();
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

fn check_keys(section: &str, map: &Map<String, Value>) -> Result<()> {
    for key in map.keys() {
        if key.is_empty() {
            return Err(Error::Validation(format!("{} contains an empty key", section)));
        }
        if key == CONNECTOR_NAME || key == PIPELINE_NAME {
            return Err(Error::Validation(format!(
                "{} may not set the reserved key {}",
                section, key
            )));
        }
    }
    Ok(())
}

/// Build the environment of an execution unit.
///
/// The result only depends on the arguments: the same inputs always give the
/// same variable set. Secrets win over settings on key collision.
pub fn build_environment(
    pipeline_name: &str,
    adapter_name: &str,
    config: &ConnectorConfig,
) -> Result<BTreeMap<String, String>> {
    if pipeline_name.trim().is_empty() {
        return Err(Error::Validation("pipeline_name is required".to_string()));
    }
    if adapter_name.trim().is_empty() {
        return Err(Error::Validation("adapter_name is required".to_string()));
    }
    check_keys("settings", &config.settings)?;
    check_keys("secrets", &config.secrets)?;

    let mut env = BTreeMap::new();
    env.insert(CONNECTOR_NAME.to_string(), adapter_name.to_string());
    env.insert(PIPELINE_NAME.to_string(), pipeline_name.to_string());

    for (key, value) in &config.settings {
        env.insert(key.clone(), flatten_value(value));
    }
    for (key, value) in &config.secrets {
        if env.insert(key.clone(), flatten_value(value)).is_some() {
            warn!("Secret {} overrides the setting of the same name", key);
        }
    }

    Ok(env)
}
