//! The boundary the chat layer talks to.
//!
//! `TorrentService` wires the orchestrator, classifier, formatter, session
//! store and fallback manager together: `start_search` produces a rendered
//! result list and caches it per user, `handle_selection` consumes the cache
//! and drives the download fallback chain for the chosen entry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::classify_results;
use crate::config::{Config, FormatConfig};
use crate::fallback::{DownloadAttempt, FallbackManager, HttpTorrentFetcher};
use crate::formatter::{format_no_results, format_results, FormattedSearch};
use crate::searcher::{JackettProvider, SearchError, SearchMode, SearchOrchestrator};
use crate::session::{SessionEntry, SessionStore, UserId};
use crate::torrent_client::{QBittorrentClient, TorrentClient};
use crate::util::{format_eta, human_speed};

/// Flags a search runs with, as parsed by the chat layer.
#[derive(Debug, Clone)]
pub struct SearchFlags {
    pub mode: SearchMode,
    /// Target folder under the save root.
    pub folder: Option<String>,
    /// Notify the user when the download completes.
    pub notify: bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self {
            mode: SearchMode::Fast,
            folder: None,
            notify: false,
        }
    }
}

/// Errors surfaced to the chat layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no active search for user {0}")]
    NoActiveSearch(UserId),

    #[error("invalid selection {index}: only {available} results available")]
    InvalidSelection { index: usize, available: usize },

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// The torrent search/download service exposed to the chat layer.
pub struct TorrentService {
    orchestrator: Arc<SearchOrchestrator>,
    torrent_client: Arc<dyn TorrentClient>,
    fallback: FallbackManager,
    sessions: SessionStore,
    format: FormatConfig,
    save_root: String,
}

impl TorrentService {
    pub fn new(
        orchestrator: Arc<SearchOrchestrator>,
        torrent_client: Arc<dyn TorrentClient>,
        fallback: FallbackManager,
        format: FormatConfig,
        save_root: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            torrent_client,
            fallback,
            sessions: SessionStore::new(),
            format,
            save_root: save_root.into(),
        }
    }

    /// Wire up the full service from configuration: Jackett provider,
    /// qBittorrent client, HTTP torrent fetcher, orchestrator and fallback
    /// manager.
    pub fn from_config(config: &Config) -> Self {
        let provider = Arc::new(JackettProvider::new(config.jackett.clone()));
        let orchestrator = Arc::new(SearchOrchestrator::new(provider, config.search.clone()));
        let torrent_client: Arc<dyn TorrentClient> =
            Arc::new(QBittorrentClient::new(config.qbittorrent.clone()));
        let fetcher = Arc::new(HttpTorrentFetcher::new(config.jackett.connect_timeout_secs));
        let fallback = FallbackManager::new(
            Arc::clone(&torrent_client),
            fetcher,
            Arc::clone(&orchestrator),
            config.fallback.clone(),
        );

        Self::new(
            orchestrator,
            torrent_client,
            fallback,
            config.format.clone(),
            config.qbittorrent.save_root.clone(),
        )
    }

    /// Run a search and cache its results for later selection.
    ///
    /// An empty outcome is not an error: the rendered text then carries the
    /// per-indexer failures and mode-specific suggestions.
    pub async fn start_search(
        &self,
        user: UserId,
        query: &str,
        flags: SearchFlags,
    ) -> Result<FormattedSearch, ServiceError> {
        info!(user, query, mode = flags.mode.as_str(), "Starting search");

        let outcome = self.orchestrator.search(query, flags.mode).await?;

        if outcome.results.is_empty() {
            debug!(user, errors = outcome.errors.len(), "Search found nothing");
            return Ok(FormattedSearch {
                text: format_no_results(query, flags.mode, &outcome.errors),
                shown: 0,
                total: 0,
            });
        }

        let classified = classify_results(outcome.results);
        let formatted = format_results(&classified, query, flags.mode, &self.format);

        self.sessions
            .replace(
                user,
                SessionEntry {
                    results: classified,
                    folder: flags.folder,
                    mode: flags.mode,
                    notify: flags.notify,
                },
            )
            .await;

        Ok(formatted)
    }

    /// Download the result the user picked from their last search.
    ///
    /// `index` is zero-based into the most recently displayed list. The
    /// session is consumed either way, so a stale list cannot be re-used.
    pub async fn handle_selection(
        &self,
        user: UserId,
        index: usize,
    ) -> Result<DownloadAttempt, ServiceError> {
        let session = self
            .sessions
            .take(user)
            .await
            .ok_or(ServiceError::NoActiveSearch(user))?;

        let Some(chosen) = session.results.get(index) else {
            return Err(ServiceError::InvalidSelection {
                index,
                available: session.results.len(),
            });
        };

        let save_path = match &session.folder {
            Some(folder) if !folder.is_empty() => format!("{}/{}", self.save_root, folder),
            _ => self.save_root.clone(),
        };

        info!(
            user,
            title = %chosen.result.title,
            save_path = %save_path,
            "Selection received, starting download"
        );

        let mut attempt = self.fallback.download(&chosen.result, &save_path).await;
        if attempt.success {
            attempt.message = self
                .enrich_success_message(&attempt.message, chosen, &save_path)
                .await;
        }

        Ok(attempt)
    }

    /// Append live torrent status to the success message when the client can
    /// already see the new torrent.
    async fn enrich_success_message(
        &self,
        base: &str,
        chosen: &crate::classifier::ClassifiedResult,
        save_path: &str,
    ) -> String {
        let hash = chosen.result.info_hash.clone().or_else(|| {
            chosen
                .result
                .magnet_uri
                .as_deref()
                .and_then(crate::util::extract_infohash_from_magnet)
        });

        match self
            .torrent_client
            .find_torrent(hash.as_deref(), Some(&chosen.result.title))
            .await
        {
            Ok(Some(torrent)) => format!(
                "🚀 Download started\n{}\n• Name: {}\n• Save: {}\n• State: {}\n• Progress: {:.1}%\n• DL: {} | ETA: {}",
                base,
                torrent.name,
                save_path,
                torrent.state.as_str(),
                torrent.progress * 100.0,
                human_speed(torrent.download_speed),
                format_eta(torrent.eta_secs),
            ),
            Ok(None) => format!(
                "🚀 Download started\n{}\n• Name: {}\n• Save: {}",
                base, chosen.result.title, save_path
            ),
            Err(e) => {
                warn!(error = %e, "Could not query torrent status");
                format!(
                    "🚀 Download started\n{}\n• Name: {}\n• Save: {}",
                    base, chosen.result.title, save_path
                )
            }
        }
    }
}
