//! Mock search provider for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::searcher::{
    IndexerInfo, IndexerQueryResult, RawSearchResult, SearchError, SearchProvider,
};

/// A recorded indexer query for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub indexer: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

/// Scripted behavior for one indexer.
#[derive(Debug, Clone, Default)]
struct ScriptedIndexer {
    results: Vec<RawSearchResult>,
    error: Option<String>,
    delay: Option<Duration>,
}

/// Mock implementation of the SearchProvider trait.
///
/// Provides controllable behavior for testing:
/// - Script per-indexer results, error messages and response delays
/// - Script the aggregator's indexer listing (or its failure)
/// - Track issued queries for assertions
///
/// Unscripted indexers respond with an empty result set and no error.
#[derive(Default)]
pub struct MockSearchProvider {
    scripted: RwLock<HashMap<String, ScriptedIndexer>>,
    listing: RwLock<Option<Vec<IndexerInfo>>>,
    listing_error: RwLock<Option<String>>,
    recorded: RwLock<Vec<RecordedQuery>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an indexer to return the given results.
    pub async fn script_indexer(&self, indexer: &str, results: Vec<RawSearchResult>) {
        self.scripted
            .write()
            .await
            .entry(indexer.to_string())
            .or_default()
            .results = results;
    }

    /// Script an indexer to report an error (alongside any scripted results).
    pub async fn script_error(&self, indexer: &str, message: &str) {
        self.scripted
            .write()
            .await
            .entry(indexer.to_string())
            .or_default()
            .error = Some(message.to_string());
    }

    /// Delay an indexer's response.
    pub async fn set_delay(&self, indexer: &str, delay: Duration) {
        self.scripted
            .write()
            .await
            .entry(indexer.to_string())
            .or_default()
            .delay = Some(delay);
    }

    /// Script the aggregator's indexer listing.
    pub async fn set_listing(&self, indexers: Vec<IndexerInfo>) {
        *self.listing.write().await = Some(indexers);
    }

    /// Make the indexer listing fail with the given message.
    pub async fn set_listing_error(&self, message: &str) {
        *self.listing_error.write().await = Some(message.to_string());
    }

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded.read().await.clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_indexers(
        &self,
        include_unconfigured: bool,
    ) -> Result<Vec<IndexerInfo>, SearchError> {
        if let Some(message) = self.listing_error.read().await.clone() {
            return Err(SearchError::ApiError(message));
        }

        let listing = self.listing.read().await.clone().unwrap_or_default();
        Ok(listing
            .into_iter()
            .filter(|i| include_unconfigured || i.configured)
            .collect())
    }

    async fn query_indexer(&self, indexer: &str, query: &str) -> IndexerQueryResult {
        self.recorded.write().await.push(RecordedQuery {
            indexer: indexer.to_string(),
            query: query.to_string(),
            timestamp: Utc::now(),
        });

        let script = self.scripted.read().await.get(indexer).cloned();
        let Some(script) = script else {
            return IndexerQueryResult::default();
        };

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        IndexerQueryResult {
            results: script.results,
            error: script.error,
        }
    }
}
