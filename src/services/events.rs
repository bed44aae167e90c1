// src/services/events.rs

//! Marketplace event feed and notification sink collaborators.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{MarketEvent, PollerConfig};
use crate::services::names::{HttpNameLookup, NameCache};

/// An endpoint returning its own recent-events window on each call.
///
/// No pagination cursor is involved; consecutive batches may overlap and the
/// poller deduplicates by timestamp.
#[async_trait]
pub trait EventFeed: Send + Sync {
    async fn fetch_batch(&self) -> Result<Vec<Value>>;
}

/// Downstream consumer of deduplicated events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &MarketEvent) -> Result<()>;
}

/// HTTP event feed reading a JSON batch from a fixed endpoint.
pub struct HttpEventFeed {
    client: reqwest::Client,
    endpoint: String,
    events_field: String,
}

impl HttpEventFeed {
    pub fn new(client: reqwest::Client, config: &PollerConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            events_field: config.events_field.clone(),
        }
    }
}

#[async_trait]
impl EventFeed for HttpEventFeed {
    async fn fetch_batch(&self) -> Result<Vec<Value>> {
        let body: Value = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_events(&body, &self.events_field, &self.endpoint)
    }
}

/// Pull the event array out of a batch response body.
fn extract_events(body: &Value, events_field: &str, endpoint: &str) -> Result<Vec<Value>> {
    match body.get(events_field) {
        Some(Value::Array(events)) => Ok(events.clone()),
        Some(_) => Err(AppError::source(
            endpoint,
            format!("'{events_field}' is not an array"),
        )),
        None => Err(AppError::source(
            endpoint,
            format!("response has no '{events_field}' field"),
        )),
    }
}

/// Console notification sink for the CLI.
///
/// Real chat delivery lives outside this crate; this sink logs one line per
/// event, resolving the seller address to a display name when possible.
pub struct LogSink {
    names: NameCache<HttpNameLookup>,
}

impl LogSink {
    pub fn new(names: NameCache<HttpNameLookup>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, event: &MarketEvent) -> Result<()> {
        let maker = event
            .payload
            .get("maker")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let seller = self.names.resolve_or_address(maker).await;
        let price = match event.payload.get("price") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "?".to_string(),
        };

        log::info!(
            "[{}] listing by {} at {} ETH",
            event.created_at.to_rfc3339(),
            seller,
            price
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_events_ok() {
        let body = json!({ "orders": [ { "createdAt": "2022-05-01T12:30:00Z" } ] });
        let events = extract_events(&body, "orders", "test").unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_extract_events_missing_field() {
        let body = json!({ "continuation": null });
        assert!(matches!(
            extract_events(&body, "orders", "test"),
            Err(AppError::Source { .. })
        ));
    }

    #[test]
    fn test_extract_events_wrong_shape() {
        let body = json!({ "orders": "nope" });
        assert!(extract_events(&body, "orders", "test").is_err());
    }
}
