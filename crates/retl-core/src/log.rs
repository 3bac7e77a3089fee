use crate::Result;
use async_trait::async_trait;

/// One record read back from the shared log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
}

impl LogMessage {
    /// Message key as text, empty when the message has no key
    pub fn key_str(&self) -> String {
        self.key
            .as_deref()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .unwrap_or_default()
    }
}

/// Producing side of the shared log
#[async_trait]
pub trait LogPublisher: Send {
    /// Publish one message and wait until the broker acknowledged it
    async fn publish(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Consuming side of the shared log, a member of one consumer group
#[async_trait]
pub trait LogSubscriber: Send {
    /// Receive the next message
    /// Returns None if the log is closed (never happens against a real broker)
    async fn next(&mut self) -> Result<Option<LogMessage>>;
}

/// Connection factory for the shared log
#[async_trait]
pub trait LogTransport: Send + Sync {
    async fn publisher(&self) -> Result<Box<dyn LogPublisher>>;

    async fn subscriber(&self, group_id: &str) -> Result<Box<dyn LogSubscriber>>;
}

/// Consumer group joined by every loader of the given adapter type.
///
/// The group is per adapter, not per pipeline: two pipelines sharing a
/// destination adapter split the stream between them.
pub fn consumer_group_id(adapter_name: &str) -> String {
    format!("{}-consumer-group", adapter_name)
}
