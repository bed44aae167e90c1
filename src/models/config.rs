//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Project index rebuild settings
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Marketplace event poller settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Random sampling settings
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Account name resolution settings
    #[serde(default)]
    pub names: NamesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.indexer.page_size == 0 {
            return Err(AppError::validation("indexer.page_size must be > 0"));
        }
        if self.indexer.refresh_interval_minutes == 0 {
            return Err(AppError::validation(
                "indexer.refresh_interval_minutes must be > 0",
            ));
        }
        if self.indexer.contracts.is_empty() {
            return Err(AppError::validation("No contracts defined"));
        }
        if self.poller.poll_interval_ms == 0 {
            return Err(AppError::validation("poller.poll_interval_ms must be > 0"));
        }
        if self.sampler.max_attempts == 0 {
            return Err(AppError::validation("sampler.max_attempts must be > 0"));
        }
        for endpoint in [
            &self.indexer.graph_url,
            &self.indexer.metadata_url,
            &self.poller.endpoint,
            &self.names.endpoint,
        ] {
            url::Url::parse(endpoint)?;
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Project index rebuild settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Subgraph endpoint for project data
    #[serde(default = "defaults::graph_url")]
    pub graph_url: String,

    /// Metadata endpoint for project creation timestamps
    #[serde(default = "defaults::metadata_url")]
    pub metadata_url: String,

    /// Core contract addresses to index
    #[serde(default = "defaults::contracts")]
    pub contracts: Vec<String>,

    /// Minutes between full index rebuilds
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_minutes: u64,

    /// Records requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            graph_url: defaults::graph_url(),
            metadata_url: defaults::metadata_url(),
            contracts: defaults::contracts(),
            refresh_interval_minutes: defaults::refresh_interval(),
            page_size: defaults::page_size(),
        }
    }
}

/// Marketplace event poller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Activity endpoint returning a recent-events window
    #[serde(default = "defaults::poll_endpoint")]
    pub endpoint: String,

    /// Milliseconds between polls
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Response field holding the event array
    #[serde(default = "defaults::events_field")]
    pub events_field: String,

    /// Event field holding the creation timestamp
    #[serde(default = "defaults::timestamp_field")]
    pub timestamp_field: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::poll_endpoint(),
            poll_interval_ms: defaults::poll_interval(),
            events_field: defaults::events_field(),
            timestamp_field: defaults::timestamp_field(),
        }
    }
}

/// Random sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Random probes before giving up
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
        }
    }
}

/// Account name resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Profile endpoint; the address is appended as a path segment
    #[serde(default = "defaults::names_endpoint")]
    pub endpoint: String,

    /// Optional API key sent as `X-API-KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::names_endpoint(),
            api_key: None,
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; artindex/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Indexer defaults
    pub fn graph_url() -> String {
        "https://api.thegraph.com/subgraphs/name/artblocks/art-blocks".into()
    }
    pub fn metadata_url() -> String {
        "https://artblocks-mainnet.hasura.app/v1/graphql".into()
    }
    pub fn contracts() -> Vec<String> {
        vec![
            "0x059edd72cd353df5106d2b9cc5ab83a52287ac3a".into(),
            "0xa7d8d9ef8d8ce8992df33d8b8cf4aebabd5bd270".into(),
            "0x99a9b7c1116f9ceeb1652de04d5969cce509b069".into(),
        ]
    }
    pub fn refresh_interval() -> u64 {
        60
    }
    pub fn page_size() -> usize {
        1000
    }

    // Poller defaults
    pub fn poll_endpoint() -> String {
        "https://api.reservoir.tools/orders/asks/v2".into()
    }
    pub fn poll_interval() -> u64 {
        60_000
    }
    pub fn events_field() -> String {
        "orders".into()
    }
    pub fn timestamp_field() -> String {
        "createdAt".into()
    }

    // Sampler defaults
    pub fn max_attempts() -> u32 {
        10
    }

    // Names defaults
    pub fn names_endpoint() -> String {
        "https://api.opensea.io/user".into()
    }
}
