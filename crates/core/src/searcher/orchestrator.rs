//! Search orchestration: concurrent fan-out across indexers, incremental
//! merge/rank, and per-mode breadth strategies.
//!
//! Each indexer query runs as its own task returning its own sub-list; the
//! orchestrator merges sub-lists as tasks complete, so there is no shared
//! mutable state between in-flight queries. Fast mode stops early once the
//! merged, deduplicated count reaches the configured limit; dropping the
//! remaining futures cancels them cooperatively and discards any partial
//! results.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::metrics;

use super::dedup::{deduplicate, sort_by_seeders};
use super::{
    IndexerError, RawSearchResult, SearchError, SearchMode, SearchOutcome, SearchProgress,
    SearchProvider,
};

/// How many results with nonzero seeders fast mode must produce before
/// extended mode skips the expansion step.
const EXTENDED_GOOD_RESULT_THRESHOLD: usize = 3;

/// How many extra indexers extended mode adds on top of the popular list.
const EXTENDED_EXPANSION_COUNT: usize = 4;

/// Orchestrates torrent searches across a variable set of indexers.
pub struct SearchOrchestrator {
    provider: Arc<dyn SearchProvider>,
    config: SearchConfig,
    progress: Option<Arc<dyn SearchProgress>>,
}

impl SearchOrchestrator {
    /// Create a new orchestrator over the given provider.
    pub fn new(provider: Arc<dyn SearchProvider>, config: SearchConfig) -> Self {
        Self {
            provider,
            config,
            progress: None,
        }
    }

    /// Attach a progress observer, notified as each indexer completes.
    pub fn with_progress(mut self, progress: Arc<dyn SearchProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execute a search in the given mode.
    ///
    /// Individual indexer failures never abort the search; they are collected
    /// in the outcome's error list. An `Err` is returned only for
    /// configuration-level problems such as an empty indexer list.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
    ) -> Result<SearchOutcome, SearchError> {
        let start = Instant::now();
        metrics::SEARCHES_TOTAL
            .with_label_values(&[mode.as_str()])
            .inc();

        let (results, errors) = match mode {
            SearchMode::Fast => self.search_fast(query).await?,
            SearchMode::Extended => self.search_extended(query).await?,
            SearchMode::Rich => self.search_rich(query).await?,
            SearchMode::All => self.search_all(query).await?,
            SearchMode::Music => self.search_music(query).await?,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        metrics::SEARCH_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(duration_ms as f64 / 1000.0);
        metrics::SEARCH_RESULTS.observe(results.len() as f64);

        debug!(
            mode = mode.as_str(),
            results = results.len(),
            errors = errors.len(),
            duration_ms,
            "Search complete"
        );

        Ok(SearchOutcome {
            results,
            errors,
            mode,
            duration_ms,
        })
    }

    /// Fast mode: short popular list, early stop at the limit.
    async fn search_fast(
        &self,
        query: &str,
    ) -> Result<(Vec<RawSearchResult>, Vec<IndexerError>), SearchError> {
        let indexers = self.config.popular_indexers.clone();
        if indexers.is_empty() {
            return Err(SearchError::NoIndexersConfigured);
        }

        let workers = self.config.max_workers.min(indexers.len()).max(1);
        let limit = self.config.fast_limit;
        let (mut results, errors) = self
            .fan_out(&indexers, query, workers, Some(limit))
            .await;
        results.truncate(limit);
        Ok((results, errors))
    }

    /// Extended mode: fast first, then up to four untried fallback indexers
    /// when fewer than three results have any seeders.
    async fn search_extended(
        &self,
        query: &str,
    ) -> Result<(Vec<RawSearchResult>, Vec<IndexerError>), SearchError> {
        let indexers = self.config.popular_indexers.clone();
        if indexers.is_empty() {
            return Err(SearchError::NoIndexersConfigured);
        }

        let limit = self.config.fast_limit * 2;
        let workers = self.config.max_workers.min(indexers.len()).max(1);
        let (mut results, mut errors) = self
            .fan_out(&indexers, query, workers, Some(limit))
            .await;

        let good = results.iter().filter(|r| r.seeders > 0).count();
        if good < EXTENDED_GOOD_RESULT_THRESHOLD {
            let extra: Vec<String> = self
                .config
                .fallback_indexers
                .iter()
                .filter(|i| !self.config.popular_indexers.contains(i))
                .take(EXTENDED_EXPANSION_COUNT)
                .cloned()
                .collect();

            if !extra.is_empty() {
                debug!(indexers = ?extra, "Expanding search to fallback indexers");
                let workers = self.config.max_workers.min(extra.len()).max(1);
                let (more, more_errors) = self.fan_out(&extra, query, workers, None).await;
                results.extend(more);
                errors.extend(more_errors);
                sort_by_seeders(&mut results);
                results = deduplicate(results);
            }
        }

        results.truncate(limit);
        Ok((results, errors))
    }

    /// Rich mode: every indexer the aggregator reports as configured.
    async fn search_rich(
        &self,
        query: &str,
    ) -> Result<(Vec<RawSearchResult>, Vec<IndexerError>), SearchError> {
        let indexers = match self.provider.list_indexers(false).await {
            Ok(listed) if !listed.is_empty() => {
                listed.into_iter().map(|i| i.id).collect::<Vec<_>>()
            }
            Ok(_) => {
                warn!("No configured indexers reported, using popular list");
                self.config.popular_indexers.clone()
            }
            Err(e) => {
                warn!(error = %e, "Cannot enumerate indexers, using static fallback list");
                merge_unique(&self.config.popular_indexers, &self.config.fallback_indexers)
            }
        };
        if indexers.is_empty() {
            return Err(SearchError::NoIndexersConfigured);
        }

        let workers = 8.min((indexers.len() / 3).max(4));
        let limit = self.config.rich_limit;
        let (raw, errors) = self.fan_out(&indexers, query, workers, None).await;
        let mut results = rank(raw);
        results.truncate(limit);
        Ok((results, errors))
    }

    /// All mode: every indexer the aggregator knows about, configured or not.
    async fn search_all(
        &self,
        query: &str,
    ) -> Result<(Vec<RawSearchResult>, Vec<IndexerError>), SearchError> {
        let indexers = match self.provider.list_indexers(true).await {
            Ok(listed) if !listed.is_empty() => {
                listed.into_iter().map(|i| i.id).collect::<Vec<_>>()
            }
            _ => {
                warn!("Cannot enumerate indexers, using exhaustive static list");
                merge_unique(&self.config.all_indexers, &self.config.popular_indexers)
            }
        };
        if indexers.is_empty() {
            return Err(SearchError::NoIndexersConfigured);
        }

        let workers = 12.min((indexers.len() / 2).max(6));
        let limit = self.config.all_limit;
        let (raw, errors) = self.fan_out(&indexers, query, workers, None).await;
        let mut results = rank(raw);
        results.truncate(limit);
        Ok((results, errors))
    }

    /// Music mode: curated music-oriented indexers only.
    async fn search_music(
        &self,
        query: &str,
    ) -> Result<(Vec<RawSearchResult>, Vec<IndexerError>), SearchError> {
        let indexers = self.config.music_indexers.clone();
        if indexers.is_empty() {
            return Err(SearchError::NoIndexersConfigured);
        }

        let workers = 6.min((indexers.len() / 4).max(3));
        let limit = self.config.music_limit;
        let (raw, errors) = self.fan_out(&indexers, query, workers, None).await;
        let mut results = rank(raw);
        results.truncate(limit);
        Ok((results, errors))
    }

    /// Fan out queries across indexers with a bounded worker pool.
    ///
    /// Each indexer query is an independent task returning its own sub-list;
    /// completed sub-lists are merged here, in completion order. With
    /// `early_stop` set, the merged list is re-ranked after every merge and
    /// the fan-out ends as soon as the deduplicated count reaches the target,
    /// dropping (and thereby cancelling) still-pending queries. Which results
    /// make the cut near the limit boundary then depends on indexer response
    /// timing; callers get a sorted, duplicate-free list either way.
    async fn fan_out(
        &self,
        indexers: &[String],
        query: &str,
        workers: usize,
        early_stop: Option<usize>,
    ) -> (Vec<RawSearchResult>, Vec<IndexerError>) {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let total = indexers.len();

        debug!(
            indexers = total,
            workers,
            early_stop = ?early_stop,
            query = %query,
            "Starting indexer fan-out"
        );

        let mut pending: FuturesUnordered<_> = indexers
            .iter()
            .map(|indexer| {
                let provider = Arc::clone(&self.provider);
                let semaphore = Arc::clone(&semaphore);
                let indexer = indexer.clone();
                let query = query.to_string();
                async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("semaphore never closed");
                    let outcome = provider.query_indexer(&indexer, &query).await;
                    (indexer, outcome)
                }
            })
            .collect();

        let mut merged: Vec<RawSearchResult> = Vec::new();
        let mut errors: Vec<IndexerError> = Vec::new();

        while let Some((indexer, outcome)) = pending.next().await {
            if let Some(message) = outcome.error {
                warn!(indexer = %indexer, error = %message, "Indexer failed");
                metrics::INDEXER_ERRORS.inc();
                errors.push(IndexerError {
                    indexer: indexer.clone(),
                    message,
                });
            }

            if !outcome.results.is_empty() {
                merged.extend(outcome.results);
                if early_stop.is_some() {
                    merged = rank(merged);
                }
            }

            if let Some(progress) = &self.progress {
                progress.indexer_done(&indexer, total, merged.len());
            }

            if let Some(limit) = early_stop {
                if merged.len() >= limit {
                    debug!(found = merged.len(), limit, "Early stop, cancelling remaining queries");
                    break;
                }
            }
        }

        (merged, errors)
    }
}

/// Sort by (seeders desc, title asc) and drop duplicates.
fn rank(mut results: Vec<RawSearchResult>) -> Vec<RawSearchResult> {
    sort_by_seeders(&mut results);
    deduplicate(results)
}

/// Concatenate two indexer lists, preserving order and dropping repeats.
fn merge_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for name in first.iter().chain(second) {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
