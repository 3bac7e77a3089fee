mod config;
mod kafka;
mod tls;

pub use config::BrokerConfig;
pub use kafka::{consumer_config, producer_config, KafkaPublisher, KafkaSubscriber, KafkaTransport};
pub use tls::TlsMaterial;
