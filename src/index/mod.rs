//! In-memory project index.
//!
//! This module contains:
//! - Lookup key normalization (`project_key`)
//! - The immutable published snapshot (`IndexSnapshot`)
//! - The periodic rebuild orchestrator (`ProjectIndexer`)
//! - Retry-bounded random sampling (`sample_qualifying`)

mod builder;
mod key;
mod sampler;
mod snapshot;

pub use builder::ProjectIndexer;
pub use key::project_key;
pub use sampler::sample_qualifying;
pub use snapshot::IndexSnapshot;
