//! Torrent search abstraction.
//!
//! This module provides a `SearchProvider` trait for indexer aggregator
//! backends (Jackett-style), the normalization boundary that turns untyped
//! indexer responses into typed results, ranking/deduplication, and the
//! orchestrator that fans queries out across indexers per search mode.

pub mod dedup;
pub mod normalize;

mod jackett;
mod orchestrator;
mod types;

pub use jackett::JackettProvider;
pub use orchestrator::SearchOrchestrator;
pub use types::*;
