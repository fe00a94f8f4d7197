//! HTTP indexer client.
//!
//! Talks to the passive indexer/relay backend:
//!
//! | Method | Path                  | Body / response              |
//! |--------|-----------------------|------------------------------|
//! | GET    | `/address/{id}`       | → `RecipientRecord`          |
//! | GET    | `/balances/{owner}`   | → `[StealthBalance]`         |
//! | POST   | `/withdrawals`        | `WithdrawalRecord` →         |

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use wraith_core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use wraith_core::error::{Result, WraithError};
use wraith_core::traits::Indexer;
use wraith_core::types::{RecipientRecord, StealthBalance, WithdrawalRecord};

/// Indexer client configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct IndexerConfig {
    /// Base URL of the indexer API (e.g. "https://indexer.example.com/api")
    pub base_url: String,
    /// Bearer token, if the deployment requires one
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl IndexerConfig {
    /// Creates config for the indexer at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Adds a bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// [`Indexer`] backed by the indexer's REST API.
#[derive(Debug)]
pub struct HttpIndexer {
    base: Url,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpIndexer {
    /// Creates a client from `config`.
    ///
    /// # Errors
    /// `ConfigError` for an unparseable base URL or a client that cannot be built.
    pub fn with_config(config: IndexerConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| WraithError::ConfigError(format!("invalid indexer URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(WraithError::ConfigError(format!(
                "indexer URL cannot be a base: {}",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WraithError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            api_key: config.api_key,
            http_client,
        })
    }

    /// Builds `base/segments...`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| WraithError::ConfigError("indexer URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let response = self
            .authorize(self.http_client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WraithError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WraithError::HttpError(format!(
                "{what}: HTTP {status}: {text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WraithError::HttpError(format!("{what}: invalid response body: {e}")))
    }
}

/// Maps reqwest transport failures onto the error taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> WraithError {
    if e.is_timeout() {
        WraithError::ConnectionTimeout(e.to_string())
    } else {
        WraithError::HttpError(e.to_string())
    }
}

#[async_trait]
impl Indexer for HttpIndexer {
    #[instrument(skip(self))]
    async fn lookup_address(&self, recipient: &str) -> Result<RecipientRecord> {
        let url = self.endpoint(&["address", recipient])?;
        let record: RecipientRecord = self
            .get_json(url, &format!("recipient {recipient}"))
            .await?;
        debug!(chain = %record.source_chain, "resolved recipient");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn balances(&self, recipient: &str) -> Result<Vec<StealthBalance>> {
        let url = self.endpoint(&["balances", recipient])?;
        let balances: Vec<StealthBalance> = self
            .get_json(url, &format!("balances of {recipient}"))
            .await?;
        debug!(count = balances.len(), "fetched stealth balances");
        Ok(balances)
    }

    #[instrument(skip(self, record), fields(withdrawal_id = %record.withdrawal_id))]
    async fn submit_withdrawal(&self, record: &WithdrawalRecord) -> Result<()> {
        let url = self.endpoint(&["withdrawals"])?;
        let response = self
            .authorize(self.http_client.post(url))
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WraithError::HttpError(format!(
                "withdrawal submission: HTTP {status}: {text}"
            )));
        }

        debug!("withdrawal recorded");
        Ok(())
    }
}
