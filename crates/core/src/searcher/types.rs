//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search breadth preset, trading latency for indexer coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Short popular-indexer list, early stop at the result limit.
    Fast,
    /// Fast first, then extra indexers when results look poor.
    Extended,
    /// Every indexer the aggregator reports as configured.
    Rich,
    /// Every indexer the aggregator knows about, configured or not.
    All,
    /// Curated music-oriented indexers only.
    Music,
}

impl SearchMode {
    /// Returns the string representation for logging/metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Fast => "fast",
            SearchMode::Extended => "extended",
            SearchMode::Rich => "rich",
            SearchMode::All => "all",
            SearchMode::Music => "music",
        }
    }
}

/// A single torrent search result, normalized from an indexer response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    /// Release title as reported by the indexer.
    pub title: String,
    /// Which indexer returned this result.
    pub indexer: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Seeder count (normalized, never negative).
    pub seeders: u32,
    /// Leecher/peer count (normalized, never negative).
    pub leechers: u32,
    /// Magnet URI, if the indexer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// .torrent download URL, if the indexer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_url: Option<String>,
    /// Info hash (lowercase hex), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
}

/// Outcome of querying a single indexer.
///
/// This type never carries a hard failure: a broken indexer yields empty
/// `results` plus an `error` message, so one bad indexer cannot abort an
/// overall search. An indexer-reported error can also accompany partial
/// results.
#[derive(Debug, Clone, Default)]
pub struct IndexerQueryResult {
    pub results: Vec<RawSearchResult>,
    pub error: Option<String>,
}

/// An indexer known to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerInfo {
    pub id: String,
    pub title: String,
    pub configured: bool,
}

/// A recorded per-indexer failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerError {
    pub indexer: String,
    pub message: String,
}

/// Merged, ranked outcome of a search across indexers.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Deduplicated results, sorted by (seeders desc, title asc).
    pub results: Vec<RawSearchResult>,
    /// Indexers that failed, with their error messages.
    pub errors: Vec<IndexerError>,
    /// The mode the search ran in.
    pub mode: SearchMode,
    /// How long the search took in milliseconds.
    pub duration_ms: u64,
}

/// Errors that can occur during search operations.
///
/// Per-indexer failures are not represented here; they are collected as
/// [`IndexerError`] values inside the [`SearchOutcome`]. These variants cover
/// configuration-level problems and provider plumbing.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No indexers configured")]
    NoIndexersConfigured,

    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for indexer aggregator backends (Jackett, Prowlarr, etc.).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Enumerate the indexers the aggregator knows about.
    ///
    /// With `include_unconfigured` set, unconfigured indexers are listed too.
    async fn list_indexers(
        &self,
        include_unconfigured: bool,
    ) -> Result<Vec<IndexerInfo>, SearchError>;

    /// Query a single indexer.
    ///
    /// Must not fail: any error is reported inside the returned
    /// [`IndexerQueryResult`].
    async fn query_indexer(&self, indexer: &str, query: &str) -> IndexerQueryResult;
}

/// Observer for incremental search progress, notified as each indexer
/// completes. Used by callers that surface a live "searching..." status.
pub trait SearchProgress: Send + Sync {
    fn indexer_done(&self, indexer: &str, total_indexers: usize, found_so_far: usize);
}
