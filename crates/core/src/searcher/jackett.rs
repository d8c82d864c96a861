//! Jackett search provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::JackettConfig;

use super::normalize::normalize_result;
use super::{IndexerInfo, IndexerQueryResult, SearchError, SearchProvider};

/// Jackett-backed search provider.
///
/// One instance holds one HTTP client with the configured connect/read
/// timeouts; a slow indexer can never stall a query past the read timeout.
pub struct JackettProvider {
    client: Client,
    config: JackettConfig,
}

impl JackettProvider {
    /// Create a new JackettProvider with the given configuration.
    pub fn new(config: JackettConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs as u64))
            .timeout(Duration::from_secs(config.read_timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Build the Jackett API URL for querying a single indexer.
    fn build_search_url(&self, indexer: &str, query: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.base_url(),
            urlencoding::encode(indexer),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(query)
        )
    }

    /// Issue the actual HTTP query against one indexer.
    async fn fetch_indexer(
        &self,
        indexer: &str,
        query: &str,
    ) -> Result<(Vec<Value>, Vec<IndexerReport>), SearchError> {
        let url = self.build_search_url(indexer, query);
        debug!(indexer = indexer, "Querying Jackett indexer");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: JackettResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok((parsed.results, parsed.indexers))
    }

    /// Surface a per-indexer problem Jackett reported alongside the results.
    fn indexer_reported_error(
        indexer: &str,
        reports: &[IndexerReport],
        result_count: usize,
    ) -> Option<String> {
        for report in reports {
            if let Some(err) = &report.error {
                if !err.is_empty() {
                    return Some(err.clone());
                }
            }
        }
        // No hard error: with zero results, a misconfigured or unhealthy
        // indexer is still worth reporting.
        if result_count == 0 {
            for report in reports {
                if report.configured == Some(false) {
                    return Some(format!("Indexer {} is not configured in Jackett", indexer));
                }
                if let Some(status) = report.status {
                    if status != 200 {
                        return Some(format!("Indexer {} status: {}", indexer, status));
                    }
                }
            }
        }
        None
    }
}

#[async_trait]
impl SearchProvider for JackettProvider {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn list_indexers(
        &self,
        include_unconfigured: bool,
    ) -> Result<Vec<IndexerInfo>, SearchError> {
        let mut url = format!(
            "{}/api/v2.0/indexers?apikey={}",
            self.base_url(),
            urlencoding::encode(&self.config.api_key)
        );
        if include_unconfigured {
            url.push_str("&configured=false");
        }

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(SearchError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let entries: Vec<JackettIndexerEntry> = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse indexer list: {}", e)))?;

        let indexers: Vec<IndexerInfo> = entries
            .into_iter()
            .filter(|e| include_unconfigured || e.configured)
            .map(|e| IndexerInfo {
                title: e.title.unwrap_or_else(|| e.id.clone()),
                id: e.id,
                configured: e.configured,
            })
            .collect();

        debug!(
            count = indexers.len(),
            include_unconfigured, "Listed Jackett indexers"
        );

        Ok(indexers)
    }

    async fn query_indexer(&self, indexer: &str, query: &str) -> IndexerQueryResult {
        if self.config.api_key.is_empty() {
            return IndexerQueryResult {
                results: Vec::new(),
                error: Some("Jackett API key is not configured".to_string()),
            };
        }

        match self.fetch_indexer(indexer, query).await {
            Ok((raw_results, reports)) => {
                let results: Vec<_> = raw_results
                    .iter()
                    .filter_map(|r| normalize_result(r, indexer))
                    .collect();
                let error = Self::indexer_reported_error(indexer, &reports, results.len());

                debug!(
                    indexer = indexer,
                    results = results.len(),
                    error = error.as_deref(),
                    "Indexer query complete"
                );

                IndexerQueryResult { results, error }
            }
            Err(SearchError::Timeout) => {
                warn!(indexer = indexer, "Indexer query timed out");
                IndexerQueryResult {
                    results: Vec::new(),
                    error: Some(format!(
                        "timeout after {}s",
                        self.config.read_timeout_secs
                    )),
                }
            }
            Err(e) => {
                warn!(indexer = indexer, error = %e, "Indexer query failed");
                IndexerQueryResult {
                    results: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

// Jackett API response types. `Results` entries stay untyped JSON so the
// normalization boundary owns all field-name guessing.
#[derive(Debug, Deserialize)]
struct JackettResponse {
    #[serde(rename = "Results", default)]
    results: Vec<Value>,
    #[serde(rename = "Indexers", default)]
    indexers: Vec<IndexerReport>,
}

#[derive(Debug, Deserialize)]
struct IndexerReport {
    #[serde(rename = "Error", alias = "error", default)]
    error: Option<String>,
    #[serde(alias = "Configured", default)]
    configured: Option<bool>,
    #[serde(rename = "Status", alias = "status", default)]
    status: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JackettIndexerEntry {
    #[serde(alias = "ID")]
    id: String,
    #[serde(alias = "name", alias = "Name", default)]
    title: Option<String>,
    #[serde(default)]
    configured: bool,
}
