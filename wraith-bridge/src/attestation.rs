//! Attestation service client.
//!
//! `GET {base}/messages/{source_domain}/{tx_hash}` answers with either
//!
//! ```json
//! { "attestation": "PENDING" }
//! { "attestation": "0x…", "message": "0x…" }
//! ```
//!
//! or the list form `{ "messages": [ { "attestation": …, "message": … } ] }`.
//! A 404 means the burn has not been observed yet and is reported as pending.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use wraith_core::constants::{ATTESTATION_PENDING, DEFAULT_HTTP_TIMEOUT_SECS};
use wraith_core::error::{Result, WraithError};
use wraith_core::traits::AttestationSource;
use wraith_core::types::AttestationStatus;

/// Attestation client configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AttestationConfig {
    /// Base URL of the attestation API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl AttestationConfig {
    /// Creates config for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

#[derive(Debug, Deserialize)]
struct AttestationEntry {
    attestation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AttestationResponse {
    List { messages: Vec<AttestationEntry> },
    Single(AttestationEntry),
}

impl AttestationResponse {
    fn into_status(self) -> Result<AttestationStatus> {
        let entry = match self {
            AttestationResponse::List { messages } => messages.into_iter().next(),
            AttestationResponse::Single(entry) => Some(entry),
        };

        match entry.and_then(|e| e.attestation) {
            None => Ok(AttestationStatus::Pending),
            Some(value) if value.eq_ignore_ascii_case(ATTESTATION_PENDING) => {
                Ok(AttestationStatus::Pending)
            }
            Some(value) => {
                let bytes = hex::decode(value.trim_start_matches("0x"))?;
                if bytes.is_empty() {
                    return Err(WraithError::ValidationError("empty attestation".into()));
                }
                Ok(AttestationStatus::Ready(bytes))
            }
        }
    }
}

/// [`AttestationSource`] backed by the attestation REST API.
#[derive(Debug)]
pub struct AttestationClient {
    base: Url,
    http_client: reqwest::Client,
}

impl AttestationClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    /// `ConfigError` for an unusable base URL.
    pub fn with_config(config: AttestationConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| WraithError::ConfigError(format!("invalid attestation URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(WraithError::ConfigError(format!(
                "attestation URL cannot be a base: {}",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WraithError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base, http_client })
    }

    fn message_url(&self, source_domain: u32, tx_hash: &str) -> Result<Url> {
        let domain = source_domain.to_string();
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| WraithError::ConfigError("attestation URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["messages", domain.as_str(), tx_hash]);
        Ok(url)
    }
}

#[async_trait]
impl AttestationSource for AttestationClient {
    #[instrument(skip(self))]
    async fn fetch_attestation(
        &self,
        source_domain: u32,
        tx_hash: &str,
    ) -> Result<AttestationStatus> {
        let url = self.message_url(source_domain, tx_hash)?;
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                WraithError::ConnectionTimeout(e.to_string())
            } else {
                WraithError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("burn not yet observed");
            return Ok(AttestationStatus::Pending);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WraithError::HttpError(format!(
                "attestation service: HTTP {status}: {text}"
            )));
        }

        let body: AttestationResponse = response.json().await.map_err(|e| {
            WraithError::HttpError(format!("attestation service: invalid body: {e}"))
        })?;
        let attestation = body.into_status()?;
        debug!(pending = attestation.is_pending(), "attestation fetched");
        Ok(attestation)
    }
}
