//! Environment configuration for the CLI.

use std::time::Duration;

use anyhow::{Context, Result};

use wraith_bridge::RetryPolicy;
use wraith_core::constants::{
    DEFAULT_ATTESTATION_ATTEMPTS, DEFAULT_ATTESTATION_INTERVAL_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use wraith_core::types::Chain;

const DEFAULT_ATTESTATION_URL: &str = "https://iris-api.circle.com/v1";

/// Settings read from `WRAITH_*` variables (and `.env`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WraithConfig {
    pub chain: Chain,
    pub indexer_url: Option<String>,
    pub attestation_url: String,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub http_timeout_secs: u64,
}

impl Default for WraithConfig {
    fn default() -> Self {
        Self {
            chain: Chain::Solana,
            indexer_url: None,
            attestation_url: DEFAULT_ATTESTATION_URL.into(),
            poll_interval_secs: DEFAULT_ATTESTATION_INTERVAL_SECS,
            poll_max_attempts: DEFAULT_ATTESTATION_ATTEMPTS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl WraithConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let chain = match lookup("WRAITH_CHAIN") {
            Some(v) => v
                .parse()
                .with_context(|| format!("WRAITH_CHAIN: unsupported chain {v:?}"))?,
            None => defaults.chain,
        };

        Ok(Self {
            chain,
            indexer_url: lookup("WRAITH_INDEXER_URL").filter(|v| !v.is_empty()),
            attestation_url: lookup("WRAITH_ATTESTATION_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.attestation_url),
            poll_interval_secs: parse_or(&lookup, "WRAITH_POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
            poll_max_attempts: parse_or(&lookup, "WRAITH_POLL_MAX_ATTEMPTS", defaults.poll_max_attempts)?,
            http_timeout_secs: parse_or(&lookup, "WRAITH_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
        })
    }

    /// Attestation polling policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .interval(Duration::from_secs(self.poll_interval_secs))
            .max_attempts(self.poll_max_attempts)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key}: invalid value {v:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WraithConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WraithConfig::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = WraithConfig::from_lookup(lookup(&[
            ("WRAITH_CHAIN", "sui"),
            ("WRAITH_INDEXER_URL", "http://localhost:8080"),
            ("WRAITH_POLL_INTERVAL_SECS", "2"),
            ("WRAITH_POLL_MAX_ATTEMPTS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.chain, Chain::Sui);
        assert_eq!(config.indexer_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.retry_policy().interval, Duration::from_secs(2));
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    fn test_bad_number_is_reported() {
        let err = WraithConfig::from_lookup(lookup(&[("WRAITH_POLL_MAX_ATTEMPTS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("WRAITH_POLL_MAX_ATTEMPTS"));
    }
}
