// Client configuration
//
// Configuration for the client and the Argo server it talks to, loaded from
// explicit values or environment variables.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

/// Options controlling the wait loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    polling_interval: Duration,
}

impl ClientOptions {
    /// Create options with the given polling interval, which must be non-zero
    pub fn new(polling_interval: Duration) -> Result<Self> {
        if polling_interval.is_zero() {
            return Err(ClientError::config("polling interval must be positive"));
        }
        Ok(Self { polling_interval })
    }

    /// Create options from environment variables
    ///
    /// Environment variables:
    /// - `FLOWWAIT_POLLING_INTERVAL_MS`: polling interval in milliseconds (required)
    pub fn from_env() -> Result<Self> {
        let raw = env::var("FLOWWAIT_POLLING_INTERVAL_MS")
            .map_err(|_| ClientError::config("FLOWWAIT_POLLING_INTERVAL_MS is not set"))?;
        let millis: u64 = raw.trim().parse().map_err(|_| {
            ClientError::config(format!("invalid FLOWWAIT_POLLING_INTERVAL_MS: {raw}"))
        })?;
        Self::new(Duration::from_millis(millis))
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}

/// Where and how to reach an Argo server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL, e.g. https://argo.example.com:2746
    pub url: Url,

    /// Bearer token sent on every request
    pub token: Option<String>,

    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::config(format!("invalid server URL '{url}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::config(format!(
                "server URL '{url}' cannot be used as a base"
            )));
        }
        Ok(Self {
            url,
            token: None,
            request_timeout: None,
        })
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `ARGO_SERVER`: server URL (required)
    /// - `ARGO_TOKEN`: bearer token
    /// - `ARGO_REQUEST_TIMEOUT_SECS`: per-request timeout in seconds, positive
    pub fn from_env() -> Result<Self> {
        let url = env::var("ARGO_SERVER")
            .map_err(|_| ClientError::config("ARGO_SERVER is not set"))?;
        let mut config = Self::new(&url)?;
        config.token = env::var("ARGO_TOKEN").ok().filter(|t| !t.is_empty());

        if let Ok(raw) = env::var("ARGO_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ClientError::config(format!("invalid ARGO_REQUEST_TIMEOUT_SECS: {raw}"))
                })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
