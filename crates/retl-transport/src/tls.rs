use crate::config::BrokerConfig;
use rdkafka::ClientConfig;
use retl_core::{Error, Result};
use std::path::Path;

/// Client certificate, private key and CA bundle for mutual TLS
#[derive(Clone)]
pub struct TlsMaterial {
    cert_pem: String,
    key_pem: String,
    ca_pem: String,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial").finish_non_exhaustive()
    }
}

fn read_pem(path: &Path, what: &str) -> Result<String> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        Error::TransportFatal(format!(
            "Failed to read {} from {}: {}",
            what,
            path.display(),
            e
        ))
    })?;

    if !pem.contains("-----BEGIN") {
        return Err(Error::TransportFatal(format!(
            "{} at {} is not PEM encoded",
            what,
            path.display()
        )));
    }
    Ok(pem)
}

impl TlsMaterial {
    /// Read the keypair and CA bundle from the configured paths
    pub fn load(config: &BrokerConfig) -> Result<Self> {
        Ok(Self {
            cert_pem: read_pem(&config.cert, "client certificate")?,
            key_pem: read_pem(&config.key, "client key")?,
            ca_pem: read_pem(&config.ca, "CA bundle")?,
        })
    }

    /// Set the SSL properties of a client
    pub fn apply(&self, client: &mut ClientConfig) {
        client
            .set("security.protocol", "ssl")
            .set("ssl.certificate.pem", &self.cert_pem)
            .set("ssl.key.pem", &self.key_pem)
            .set("ssl.ca.pem", &self.ca_pem);
    }
}
