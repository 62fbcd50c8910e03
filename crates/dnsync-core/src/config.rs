//! Configuration for dnsync
//!
//! The configuration is a small JSON document loaded once at startup:
//!
//! ```json
//! {
//!   "apiKey": "...",
//!   "apiEmail": "ops@example.com",
//!   "interval": "10m",
//!   "domains": ["home.example.com", "nas.example.com"]
//! }
//! ```
//!
//! It is immutable for the lifetime of the process and handed to the engine
//! explicitly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Sync interval applied when the config file leaves `interval` unset or empty
pub const DEFAULT_INTERVAL: &str = "10m";

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Main dnsync configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Provider API key
    #[serde(default)]
    pub api_key: String,

    /// Provider account email
    #[serde(default)]
    pub api_email: String,

    /// Sync interval as a duration string (e.g. "10m", "90s", "2h")
    #[serde(default)]
    pub interval: String,

    /// Fully-qualified domain names to keep pointed at this host, in order
    #[serde(default)]
    pub domains: Vec<String>,
}

// The API key must never reach the logs
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_key", &"<REDACTED>")
            .field("api_email", &self.api_email)
            .field("interval", &self.interval)
            .field("domains", &self.domains)
            .finish()
    }
}

impl SyncConfig {
    /// Create a configuration with the default interval
    pub fn new(
        api_key: impl Into<String>,
        api_email: impl Into<String>,
        domains: Vec<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_email: api_email.into(),
            interval: DEFAULT_INTERVAL.to_string(),
            domains,
        }
    }

    /// Set the interval string
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    /// Load the configuration from a JSON file
    ///
    /// Applies [`DEFAULT_INTERVAL`] when the interval is missing or empty.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Json`] if the file is not a valid configuration document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());

        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse the configuration from a JSON string
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut config: SyncConfig = serde_json::from_str(raw)?;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        if self.interval.trim().is_empty() {
            tracing::warn!("interval config not set. Using default {}", DEFAULT_INTERVAL);
            self.interval = DEFAULT_INTERVAL.to_string();
        }
    }

    /// Parse the interval string into a [`Duration`]
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the string is not a duration or is zero.
    pub fn interval(&self) -> Result<Duration> {
        let interval = humantime::parse_duration(self.interval.trim()).map_err(|e| {
            Error::config(format!("Invalid interval '{}': {}", self.interval, e))
        })?;

        if interval.is_zero() {
            return Err(Error::config("Interval must be greater than zero"));
        }

        Ok(interval)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.domains.is_empty() {
            return Err(Error::config("No domains configured"));
        }

        if let Some(blank) = self.domains.iter().position(|d| d.trim().is_empty()) {
            return Err(Error::config(format!("Domain #{} is empty", blank + 1)));
        }

        self.interval()?;

        Ok(())
    }
}
