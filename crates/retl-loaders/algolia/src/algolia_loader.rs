use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use retl_core::{Document, Error, Loader, LoaderStatus, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// Identity field of an Algolia record
pub const OBJECT_ID: &str = "objectID";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings of the `algolia` destination, read from the `ALGOLIA_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct AlgoliaConfig {
    /// Target index (`ALGOLIA_INDEX`)
    pub index: String,

    /// Application id (`ALGOLIA_APP_ID`)
    pub app_id: String,

    /// Write API key (`ALGOLIA_API_KEY`)
    pub api_key: String,

    /// Overrides `https://<app_id>.algolia.net`
    pub base_url: Option<String>,
}

impl AlgoliaConfig {
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", self.app_id))
    }
}

/// Replaces whole records by `objectID` through the Algolia REST API
pub struct AlgoliaLoader {
    config: AlgoliaConfig,
    base_url: Url,
    http: Option<reqwest::Client>,
    status: LoaderStatus,
}

impl AlgoliaLoader {
    pub fn new(config: AlgoliaConfig) -> Result<Self> {
        if config.index.trim().is_empty() {
            return Err(Error::Configuration("ALGOLIA_INDEX is required".to_string()));
        }
        let base_url = Url::parse(&config.endpoint())
            .map_err(|e| Error::Configuration(format!("Invalid Algolia endpoint: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            http: None,
            status: LoaderStatus::default(),
        })
    }

    /// `<base>/1/indexes/<index>/<objectID>` with both segments percent-encoded
    pub fn object_url(&self, id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("Algolia endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["1", "indexes", self.config.index.as_str(), id]);
        Ok(url)
    }
}

#[async_trait]
impl Loader for AlgoliaLoader {
    async fn connect(&mut self) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-algolia-application-id",
            HeaderValue::from_str(&self.config.app_id)
                .map_err(|e| Error::Configuration(format!("Invalid ALGOLIA_APP_ID: {}", e)))?,
        );
        let mut key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|e| Error::Configuration(format!("Invalid ALGOLIA_API_KEY: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-algolia-api-key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Connection(format!("Failed to build HTTP client: {}", e)))?;

        self.http = Some(http);
        self.status.connected = true;
        info!("Writing to Algolia index {}", self.config.index);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.http = None;
        self.status.connected = false;
        Ok(())
    }

    fn identity_field(&self) -> &str {
        OBJECT_ID
    }

    async fn upsert(&mut self, id: &str, document: Document) -> Result<()> {
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| Error::Connection("Not connected".to_string()))?;
        let url = self.object_url(id)?;

        let result = match http.put(url).json(&document).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(Error::DestinationWrite(format!(
                    "Algolia rejected '{}' ({}): {}",
                    id, status, body
                )))
            }
            Err(e) => Err(Error::DestinationWrite(format!(
                "Failed to send '{}' to Algolia: {}",
                id, e
            ))),
        };

        match result {
            Ok(()) => {
                self.status.documents_written += 1;
                debug!("Indexed {}", id);
                Ok(())
            }
            Err(e) => {
                self.status.errors += 1;
                self.status.last_error = Some(e.to_string());
                error!("Failed to index document: {}", e);
                Err(e)
            }
        }
    }

    fn status(&self) -> LoaderStatus {
        self.status.clone()
    }
}
