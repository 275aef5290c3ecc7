//! Configuration (layered: code > env > config file).

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DocqError, Result};

/// Global default config (lazy-initialized from env + file).
static DEFAULT_CONFIG: OnceLock<DocqConfig> = OnceLock::new();

/// Default poll interval between run status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Connection and model settings for the remote agent service.
///
/// Resolution order: explicit setters, then environment variables
/// (`DOCQ_ENDPOINT`, `DOCQ_API_KEY`, `DOCQ_CHAT_DEPLOYMENT`,
/// `DOCQ_API_VERSION`, `DOCQ_POLL_INTERVAL_MS`, `DOCQ_POLL_DEADLINE_MS`),
/// then `docq.toml` under the platform config dir.
#[derive(Debug, Clone, Default)]
pub struct DocqConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    chat_deployment: Option<String>,
    api_version: Option<String>,
    poll_interval: Option<Duration>,
    poll_deadline: Option<Duration>,
}

/// On-disk representation of `docq.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    endpoint: Option<String>,
    api_key: Option<String>,
    chat_deployment: Option<String>,
    api_version: Option<String>,
    poll_interval_ms: Option<u64>,
    poll_deadline_ms: Option<u64>,
}

impl DocqConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, falling back to `docq.toml`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let file = Self::config_file_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|text| toml::from_str::<ConfigFile>(&text).ok())
            .unwrap_or_default();

        Self {
            endpoint: std::env::var("DOCQ_ENDPOINT").ok().or(file.endpoint),
            api_key: std::env::var("DOCQ_API_KEY").ok().or(file.api_key),
            chat_deployment: std::env::var("DOCQ_CHAT_DEPLOYMENT")
                .ok()
                .or(file.chat_deployment),
            api_version: std::env::var("DOCQ_API_VERSION").ok().or(file.api_version),
            poll_interval: env_millis("DOCQ_POLL_INTERVAL_MS")
                .or(file.poll_interval_ms.map(Duration::from_millis)),
            poll_deadline: env_millis("DOCQ_POLL_DEADLINE_MS")
                .or(file.poll_deadline_ms.map(Duration::from_millis)),
        }
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static DocqConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    /// Path of the optional config file (`<config dir>/docq/docq.toml`).
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docq")
            .map(|dirs| dirs.config_dir().join("docq.toml"))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_chat_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.chat_deployment = Some(deployment.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }

    /// Service endpoint, required for any remote operation.
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| DocqError::Configuration("Missing DOCQ_ENDPOINT".into()))
    }

    /// API key, required for any remote operation.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DocqError::Configuration("Missing DOCQ_API_KEY".into()))
    }

    /// Chat model deployment used when provisioning agents.
    pub fn chat_deployment(&self) -> Result<&str> {
        self.chat_deployment
            .as_deref()
            .ok_or_else(|| DocqError::Configuration("Missing DOCQ_CHAT_DEPLOYMENT".into()))
    }

    /// API version query parameter, if the service requires one.
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn poll_deadline(&self) -> Option<Duration> {
        self.poll_deadline
    }
}

/// Millisecond duration from an environment variable; unset or unparsable
/// values are ignored.
fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
