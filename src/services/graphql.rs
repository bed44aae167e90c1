// src/services/graphql.rs

//! Thin GraphQL transport over reqwest.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// A GraphQL endpoint client.
///
/// Sends `{query, variables}` POST requests and decodes the `data` payload
/// into a caller-supplied shape. GraphQL-level errors are surfaced as
/// failures; callers classify them against their source id.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    url: String,
}

impl GraphClient {
    /// Create a client for one GraphQL endpoint.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Execute a query and decode the response data.
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let response: GraphResponse<T> = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::source(&self.url, messages.join("; ")));
        }

        response
            .data
            .ok_or_else(|| AppError::source(&self.url, "response carried no data"))
    }
}
