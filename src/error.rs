// src/error.rs

//! Unified error handling for the indexer application.

use std::fmt;

use thiserror::Error;

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upstream source failed to respond
    #[error("Source '{source_id}' unavailable: {message}")]
    Source { source_id: String, message: String },

    /// An event batch entry could not be validated
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Delivery to the notification sink failed
    #[error("Sink delivery failed: {0}")]
    Sink(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source-unavailable error with the failing source id.
    pub fn source(source_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-event error.
    pub fn malformed_event(message: impl fmt::Display) -> Self {
        Self::MalformedEvent(message.to_string())
    }

    /// Create a sink-delivery error.
    pub fn sink(message: impl fmt::Display) -> Self {
        Self::Sink(message.to_string())
    }
}
