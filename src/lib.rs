// src/lib.rs

//! artindex library
//!
//! Aggregates generative-art project metadata from subgraph sources into an
//! in-memory index, and polls a marketplace activity endpoint to forward
//! deduplicated events to a notification sink.

pub mod error;
pub mod index;
pub mod models;
pub mod poller;
pub mod services;
pub mod utils;
