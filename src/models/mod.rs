// src/models/mod.rs

//! Domain models for the indexer application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod project;

// Re-export all public types
pub use config::{Config, HttpConfig, IndexerConfig, NamesConfig, PollerConfig, SamplerConfig};
pub use event::MarketEvent;
pub use project::Project;
