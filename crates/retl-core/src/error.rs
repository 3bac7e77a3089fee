use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request fields. Client-facing.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Durable catalog I/O failure. Not retried.
    #[error("Store error: {0}")]
    Store(String),

    /// Execution-unit submission failure. Not retried, nothing rolled back.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Broker connect or publish failure inside a runtime. Terminates the runtime.
    #[error("Transport error: {0}")]
    TransportFatal(String),

    /// Per-document upsert failure inside a loader. Logged, the loop continues.
    #[error("Destination write error: {0}")]
    DestinationWrite(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Configuration(e.to_string())
    }
}
