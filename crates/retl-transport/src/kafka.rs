use crate::config::BrokerConfig;
use crate::tls::TlsMaterial;
use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use retl_core::{Error, LogMessage, LogPublisher, LogSubscriber, LogTransport, Result};
use std::time::Duration;
use tracing::{debug, info};

fn base_config(config: &BrokerConfig, tls: &TlsMaterial) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", &config.brokers)
        .set(
            "socket.connection.setup.timeout.ms",
            config.dial_timeout_ms.to_string(),
        );
    tls.apply(&mut client);
    client
}

/// Producer properties: every publish waits for the full acknowledgement
pub fn producer_config(config: &BrokerConfig, tls: &TlsMaterial) -> ClientConfig {
    let mut client = base_config(config, tls);
    client
        .set("acks", "all")
        .set("message.timeout.ms", config.message_timeout_ms.to_string());
    client
}

/// Consumer properties: join `group_id` at the latest offset, fetch in
/// batches, commit offsets periodically
pub fn consumer_config(config: &BrokerConfig, tls: &TlsMaterial, group_id: &str) -> ClientConfig {
    let mut client = base_config(config, tls);
    client
        .set("group.id", group_id)
        .set("auto.offset.reset", "latest")
        .set("fetch.min.bytes", "10000")
        .set("fetch.max.bytes", "10000000")
        .set("enable.auto.commit", "true")
        .set("auto.commit.interval.ms", "1000");
    client
}

/// Synchronous publisher over a `FutureProducer`
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

#[async_trait]
impl LogPublisher for KafkaPublisher {
    async fn publish(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let record = FutureRecord::to(&self.topic).key(key).payload(value);
        let (partition, offset) = self
            .producer
            .send(record, self.timeout)
            .await
            .map_err(|(e, _)| Error::TransportFatal(format!("Failed to publish: {}", e)))?;

        debug!("Published to {}[{}]@{}", self.topic, partition, offset);
        Ok(())
    }
}

/// Consumer-group member reading the shared topic
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
}

#[async_trait]
impl LogSubscriber for KafkaSubscriber {
    async fn next(&mut self) -> Result<Option<LogMessage>> {
        let msg = self
            .consumer
            .recv()
            .await
            .map_err(|e| Error::TransportFatal(format!("Failed to read from log: {}", e)))?;

        Ok(Some(LogMessage {
            key: msg.key().map(<[u8]>::to_vec),
            value: msg.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            partition: msg.partition(),
            offset: msg.offset(),
        }))
    }
}

/// Kafka-backed shared log with client-certificate TLS
pub struct KafkaTransport {
    config: BrokerConfig,
    tls: TlsMaterial,
}

impl KafkaTransport {
    pub fn new(config: BrokerConfig, tls: TlsMaterial) -> Self {
        Self { config, tls }
    }

    /// Read the TLS material the config points at
    pub fn connect(config: BrokerConfig) -> Result<Self> {
        let tls = TlsMaterial::load(&config)?;
        Ok(Self::new(config, tls))
    }
}

#[async_trait]
impl LogTransport for KafkaTransport {
    async fn publisher(&self) -> Result<Box<dyn LogPublisher>> {
        let producer: FutureProducer = producer_config(&self.config, &self.tls)
            .create()
            .map_err(|e| Error::TransportFatal(format!("Failed to create producer: {}", e)))?;

        info!(
            "Publishing to {} on {}",
            self.config.topic, self.config.brokers
        );
        Ok(Box::new(KafkaPublisher {
            producer,
            topic: self.config.topic.clone(),
            timeout: Duration::from_millis(self.config.message_timeout_ms),
        }))
    }

    async fn subscriber(&self, group_id: &str) -> Result<Box<dyn LogSubscriber>> {
        let consumer: StreamConsumer = consumer_config(&self.config, &self.tls, group_id)
            .create()
            .map_err(|e| Error::TransportFatal(format!("Failed to create consumer: {}", e)))?;

        consumer
            .subscribe(&[self.config.topic.as_str()])
            .map_err(|e| Error::TransportFatal(format!("Failed to subscribe: {}", e)))?;

        info!(
            "Consuming {} on {} as {}",
            self.config.topic, self.config.brokers, group_id
        );
        Ok(Box::new(KafkaSubscriber { consumer }))
    }
}
