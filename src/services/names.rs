// src/services/names.rs

//! Account name resolution with a memoizing cache.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::NamesConfig;

/// Remote lookup from an address to a display name.
#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Returns `Ok(None)` when the address legitimately has no name.
    async fn lookup(&self, address: &str) -> Result<Option<String>>;
}

/// Memoizing name resolver.
///
/// A successful lookup is cached, including the "no name" case as an empty
/// string. A failed lookup returns an empty string to the caller but is NOT
/// cached, so transient failures self-heal on the next call. Concurrent
/// misses for the same address may both hit the remote; the duplicate work is
/// bounded and harmless, so no per-key lock is held across the fetch.
pub struct NameCache<L: NameLookup> {
    lookup: L,
    cache: Mutex<HashMap<String, String>>,
}

impl<L: NameLookup> NameCache<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an address to its display name, or empty string if there is
    /// none (or the lookup failed).
    pub async fn resolve(&self, address: &str) -> String {
        if let Some(hit) = self.cache.lock().await.get(address) {
            return hit.clone();
        }

        match self.lookup.lookup(address).await {
            Ok(found) => {
                let name = found.unwrap_or_default();
                self.cache
                    .lock()
                    .await
                    .insert(address.to_string(), name.clone());
                name
            }
            Err(e) => {
                log::warn!("Name lookup failed for {}: {}", address, e);
                String::new()
            }
        }
    }

    /// Resolve an address, falling back to the address itself when no name
    /// is known.
    pub async fn resolve_or_address(&self, address: &str) -> String {
        let name = self.resolve(address).await;
        if name.is_empty() {
            address.to_string()
        } else {
            name
        }
    }
}

/// HTTP profile lookup: GET `{endpoint}/{address}`, reading a `username`
/// field. A `detail` field in the body signals an API-level error (usually
/// rate limiting) and is treated as a failure.
pub struct HttpNameLookup {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNameLookup {
    pub fn new(client: reqwest::Client, config: &NamesConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl NameLookup for HttpNameLookup {
    async fn lookup(&self, address: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.endpoint, address);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        if let Some(detail) = body.get("detail").and_then(Value::as_str) {
            return Err(AppError::source("names", detail));
        }

        Ok(body
            .get("username")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }
}
