//! Multi-tier download fallback.
//!
//! Given a chosen search result, tries in order: direct magnet link,
//! fetch-and-add of the .torrent file, a magnet reconstructed from the info
//! hash, and (behind the `aggressive` flag) an alternative-source search
//! across other indexers. The chain is terminal on first success; a total
//! failure reports every method that was tried.

mod fetcher;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FallbackConfig;
use crate::metrics;
use crate::searcher::{RawSearchResult, SearchMode, SearchOrchestrator};
use crate::torrent_client::TorrentClient;

pub use fetcher::{FetchError, FetchedFile, HttpTorrentFetcher, TorrentFetcher};

/// Fetch attempts for candidates found by the alternative-source search.
const ALTERNATIVE_FETCH_ATTEMPTS: u32 = 2;

/// Public trackers appended to reconstructed magnet links.
const PUBLIC_TRACKERS: [&str; 4] = [
    "udp://tracker.openbittorrent.com:80/announce",
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://9.rarbg.to:2710/announce",
    "udp://exodus.desync.com:6969/announce",
];

/// A download method in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMethod {
    Magnet,
    TorrentFile,
    ReconstructedMagnet,
    AlternativeSource,
}

impl DownloadMethod {
    /// Human-readable method description.
    pub fn describe(&self) -> &'static str {
        match self {
            DownloadMethod::Magnet => "magnet link",
            DownloadMethod::TorrentFile => ".torrent file",
            DownloadMethod::ReconstructedMagnet => "reconstructed magnet link",
            DownloadMethod::AlternativeSource => "alternative source",
        }
    }
}

/// Outcome of a download attempt.
#[derive(Debug, Clone)]
pub struct DownloadAttempt {
    pub success: bool,
    /// The method that succeeded, when any did.
    pub method: Option<DownloadMethod>,
    /// Human-readable status, naming the methods tried on failure.
    pub message: String,
}

impl DownloadAttempt {
    fn succeeded(method: DownloadMethod) -> Self {
        Self {
            success: true,
            method: Some(method),
            message: format!("✅ Downloaded via {}", method.describe()),
        }
    }
}

/// Manages fallback download methods when the primary method fails.
pub struct FallbackManager {
    torrent_client: Arc<dyn TorrentClient>,
    fetcher: Arc<dyn TorrentFetcher>,
    orchestrator: Arc<SearchOrchestrator>,
    config: FallbackConfig,
}

impl FallbackManager {
    pub fn new(
        torrent_client: Arc<dyn TorrentClient>,
        fetcher: Arc<dyn TorrentFetcher>,
        orchestrator: Arc<SearchOrchestrator>,
        config: FallbackConfig,
    ) -> Self {
        Self {
            torrent_client,
            fetcher,
            orchestrator,
            config,
        }
    }

    /// Attempt to start downloading the chosen result, walking the fallback
    /// chain until a method succeeds or every method is exhausted.
    pub async fn download(&self, chosen: &RawSearchResult, save_path: &str) -> DownloadAttempt {
        let mut tried: Vec<DownloadMethod> = Vec::new();

        if let Some(magnet) = non_empty(&chosen.magnet_uri) {
            tried.push(DownloadMethod::Magnet);
            match self.torrent_client.add_magnet(magnet, save_path).await {
                Ok(()) => return self.record(DownloadMethod::Magnet),
                Err(e) => warn!(error = %e, "Magnet link failed"),
            }
        }

        if let Some(link) = non_empty(&chosen.torrent_url) {
            tried.push(DownloadMethod::TorrentFile);
            match self
                .fetch_torrent_file(link, self.config.max_fetch_attempts)
                .await
            {
                Ok(bytes) => {
                    match self
                        .torrent_client
                        .add_torrent_file(bytes, save_path)
                        .await
                    {
                        Ok(()) => return self.record(DownloadMethod::TorrentFile),
                        Err(e) => warn!(error = %e, "Adding fetched torrent file failed"),
                    }
                }
                Err(e) => warn!(error = %e, "Torrent file download failed"),
            }
        }

        if let Some(hash) = non_empty(&chosen.info_hash) {
            tried.push(DownloadMethod::ReconstructedMagnet);
            let magnet = build_reconstructed_magnet(hash, &chosen.title);
            match self.torrent_client.add_magnet(&magnet, save_path).await {
                Ok(()) => return self.record(DownloadMethod::ReconstructedMagnet),
                Err(e) => warn!(error = %e, "Reconstructed magnet failed"),
            }
        }

        if self.config.aggressive {
            tried.push(DownloadMethod::AlternativeSource);
            if let Some(indexer) = self.try_alternative_sources(chosen, save_path).await {
                let mut attempt = self.record(DownloadMethod::AlternativeSource);
                attempt.message = format!("✅ Found alternative source on {}", indexer);
                return attempt;
            }
        }

        metrics::DOWNLOAD_ATTEMPTS
            .with_label_values(&["none", "failed"])
            .inc();

        let mut message = if tried.is_empty() {
            "❌ Download failed - result has no magnet link, torrent file or info hash".to_string()
        } else {
            let names: Vec<&str> = tried.iter().map(|m| m.describe()).collect();
            format!("❌ All download methods failed (tried: {})", names.join(", "))
        };
        if !self.config.aggressive {
            message.push_str(" - enable aggressive fallback for more alternatives");
        }

        DownloadAttempt {
            success: false,
            method: None,
            message,
        }
    }

    fn record(&self, method: DownloadMethod) -> DownloadAttempt {
        metrics::DOWNLOAD_ATTEMPTS
            .with_label_values(&[method.describe(), "ok"])
            .inc();
        debug!(method = method.describe(), "Download started");
        DownloadAttempt::succeeded(method)
    }

    /// Fetch the .torrent file with bounded retries, validating that the body
    /// actually is a torrent before handing it to the client.
    async fn fetch_torrent_file(&self, url: &str, attempts: u32) -> Result<Vec<u8>, String> {
        let mut last_error = String::new();

        for attempt in 1..=attempts.max(1) {
            match self.fetcher.fetch(url).await {
                Ok(file) => {
                    if is_valid_torrent(&file.bytes, file.content_type.as_deref()) {
                        return Ok(file.bytes);
                    }
                    last_error = format!(
                        "invalid response: content-type={}",
                        file.content_type.as_deref().unwrap_or("unknown")
                    );
                }
                Err(e) => {
                    last_error = format!("{} (attempt {}/{})", e, attempt, attempts);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }

        Err(last_error)
    }

    /// Search other indexers for an equivalent release and try magnet-then-
    /// file on each candidate. Returns the source indexer on success.
    async fn try_alternative_sources(
        &self,
        chosen: &RawSearchResult,
        save_path: &str,
    ) -> Option<String> {
        let outcome = match self
            .orchestrator
            .search(&chosen.title, SearchMode::Extended)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Alternative source search failed");
                return None;
            }
        };

        for alt in &outcome.results {
            // Skip the originally-chosen release
            if alt.torrent_url.is_some() && alt.torrent_url == chosen.torrent_url {
                continue;
            }
            if alt.magnet_uri.is_some() && alt.magnet_uri == chosen.magnet_uri {
                continue;
            }

            if let Some(magnet) = non_empty(&alt.magnet_uri) {
                if self
                    .torrent_client
                    .add_magnet(magnet, save_path)
                    .await
                    .is_ok()
                {
                    debug!(indexer = %alt.indexer, "Alternative magnet accepted");
                    return Some(alt.indexer.clone());
                }
            }

            if let Some(link) = non_empty(&alt.torrent_url) {
                if let Ok(bytes) = self
                    .fetch_torrent_file(link, ALTERNATIVE_FETCH_ATTEMPTS)
                    .await
                {
                    if self
                        .torrent_client
                        .add_torrent_file(bytes, save_path)
                        .await
                        .is_ok()
                    {
                        debug!(indexer = %alt.indexer, "Alternative torrent file accepted");
                        return Some(alt.indexer.clone());
                    }
                }
            }
        }

        None
    }
}

fn non_empty(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|s| !s.is_empty())
}

/// A response body counts as a torrent when the server says so, or when it
/// carries the bencode `d8:announce` signature. Some trackers serve torrents
/// as plain octet streams.
fn is_valid_torrent(bytes: &[u8], content_type: Option<&str>) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if let Some(ctype) = content_type {
        let lower = ctype.to_lowercase();
        if lower.contains("torrent") || lower.contains("octet-stream") {
            return true;
        }
    }
    bytes.starts_with(b"d8:announce")
}

/// Synthesize a minimal magnet link from an info hash, the display name and
/// a fixed set of public trackers.
fn build_reconstructed_magnet(info_hash: &str, title: &str) -> String {
    let mut magnet = format!("magnet:?xt=urn:btih:{}", info_hash);
    if !title.is_empty() {
        magnet.push_str(&format!("&dn={}", urlencoding::encode(title)));
    }
    for tracker in PUBLIC_TRACKERS {
        magnet.push_str(&format!("&tr={}", urlencoding::encode(tracker)));
    }
    magnet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::testing::{fixtures, MockSearchProvider, MockTorrentClient, MockTorrentFetcher};

    fn manager(
        client: Arc<MockTorrentClient>,
        fetcher: Arc<MockTorrentFetcher>,
        provider: Arc<MockSearchProvider>,
        aggressive: bool,
    ) -> FallbackManager {
        let orchestrator = Arc::new(SearchOrchestrator::new(
            provider,
            SearchConfig {
                popular_indexers: vec!["alt-indexer".to_string()],
                fallback_indexers: vec![],
                ..SearchConfig::default()
            },
        ));
        FallbackManager::new(
            client,
            fetcher,
            orchestrator,
            FallbackConfig {
                aggressive,
                max_fetch_attempts: 3,
                retry_delay_ms: 10,
            },
        )
    }

    fn result_with(
        magnet: Option<&str>,
        link: Option<&str>,
        hash: Option<&str>,
    ) -> RawSearchResult {
        RawSearchResult {
            title: "Test Release".to_string(),
            indexer: "origin".to_string(),
            size_bytes: 1000,
            seeders: 10,
            leechers: 1,
            magnet_uri: magnet.map(String::from),
            torrent_url: link.map(String::from),
            info_hash: hash.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_magnet_success_short_circuits() {
        let client = Arc::new(MockTorrentClient::new());
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            Arc::clone(&provider),
            true,
        );

        let chosen = result_with(
            Some("magnet:?xt=urn:btih:abc"),
            Some("http://example/file.torrent"),
            Some("abc"),
        );
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(attempt.success);
        assert_eq!(attempt.method, Some(DownloadMethod::Magnet));
        // No later tier ran: the file fetch was never issued
        assert_eq!(fetcher.fetch_count().await, 0);
        assert_eq!(client.magnet_adds().await.len(), 1);
        assert!(provider.recorded_queries().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_torrent_file_fallback_when_magnet_fails() {
        let client = Arc::new(MockTorrentClient::new());
        client.set_fail_magnet(true).await;
        let fetcher = Arc::new(MockTorrentFetcher::new());
        fetcher
            .push_response(FetchedFile {
                bytes: b"d8:announce3:abce".to_vec(),
                content_type: Some("application/x-bittorrent".to_string()),
            })
            .await;
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            provider,
            false,
        );

        let chosen = result_with(
            Some("magnet:?xt=urn:btih:abc"),
            Some("http://example/file.torrent"),
            None,
        );
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(attempt.success);
        assert_eq!(attempt.method, Some(DownloadMethod::TorrentFile));
        assert_eq!(client.file_adds().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_then_succeeds() {
        let client = Arc::new(MockTorrentClient::new());
        let fetcher = Arc::new(MockTorrentFetcher::new());
        fetcher.push_error("connection error: refused").await;
        fetcher
            .push_response(FetchedFile {
                bytes: b"d8:announce3:abce".to_vec(),
                content_type: None,
            })
            .await;
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(Arc::clone(&client), Arc::clone(&fetcher), provider, false);

        let chosen = result_with(None, Some("http://example/file.torrent"), None);
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(attempt.success);
        assert_eq!(fetcher.fetch_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_body_is_not_a_torrent() {
        let client = Arc::new(MockTorrentClient::new());
        let fetcher = Arc::new(MockTorrentFetcher::new());
        for _ in 0..3 {
            fetcher
                .push_response(FetchedFile {
                    bytes: b"<html>blocked</html>".to_vec(),
                    content_type: Some("text/html".to_string()),
                })
                .await;
        }
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(Arc::clone(&client), Arc::clone(&fetcher), provider, false);

        let chosen = result_with(None, Some("http://example/file.torrent"), None);
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(!attempt.success);
        assert!(client.file_adds().await.is_empty());
        assert!(attempt.message.contains(".torrent file"));
    }

    #[tokio::test]
    async fn test_reconstructed_magnet_without_alternative_search() {
        let client = Arc::new(MockTorrentClient::new());
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            Arc::clone(&provider),
            false,
        );

        let chosen = result_with(None, None, Some("abc123def456"));
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(attempt.success);
        assert_eq!(attempt.method, Some(DownloadMethod::ReconstructedMagnet));
        // Aggressive fallback disabled: no alternative search was run
        assert!(provider.recorded_queries().await.is_empty());

        let added = client.magnet_adds().await;
        assert_eq!(added.len(), 1);
        assert!(added[0].starts_with("magnet:?xt=urn:btih:abc123def456"));
        assert!(added[0].contains("&dn="));
        assert!(added[0].contains("&tr="));
    }

    #[tokio::test]
    async fn test_alternative_source_search_when_aggressive() {
        let client = Arc::new(MockTorrentClient::new());
        // The chosen magnet is rejected so the chain walks to the end
        client
            .fail_magnet_only_for("magnet:?xt=urn:btih:original")
            .await;
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        provider
            .script_indexer(
                "alt-indexer",
                vec![fixtures::raw_result_with_magnet(
                    "Test Release",
                    "alt-indexer",
                    15,
                    "magnet:?xt=urn:btih:different",
                )],
            )
            .await;
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            Arc::clone(&provider),
            true,
        );

        let chosen = result_with(Some("magnet:?xt=urn:btih:original"), None, None);
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(attempt.success);
        assert_eq!(attempt.method, Some(DownloadMethod::AlternativeSource));
        assert!(attempt.message.contains("alt-indexer"));
        assert!(!provider.recorded_queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_alternative_source_skips_original_link() {
        let client = Arc::new(MockTorrentClient::new());
        client.set_fail_magnet(true).await;
        client.set_fail_file(true).await;
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        // The only candidate is the originally-chosen link, so it is skipped
        provider
            .script_indexer(
                "alt-indexer",
                vec![fixtures::raw_result_with_link(
                    "Test Release",
                    "alt-indexer",
                    15,
                    "http://example/original.torrent",
                )],
            )
            .await;
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            Arc::clone(&provider),
            true,
        );

        let chosen = result_with(None, Some("http://example/original.torrent"), None);
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(!attempt.success);
        // The original link was fetched only by the file tier (3 attempts),
        // never by the alternative tier
        assert_eq!(fetcher.fetch_count().await, 3);
    }

    #[tokio::test]
    async fn test_total_failure_names_tried_methods() {
        let client = Arc::new(MockTorrentClient::new());
        client.set_fail_magnet(true).await;
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(
            Arc::clone(&client),
            Arc::clone(&fetcher),
            provider,
            false,
        );

        let chosen = result_with(Some("magnet:?xt=urn:btih:x"), None, Some("xyz"));
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(!attempt.success);
        assert!(attempt.method.is_none());
        assert!(attempt.message.contains("magnet link"));
        assert!(attempt.message.contains("reconstructed magnet link"));
        assert!(attempt.message.contains("aggressive"));
    }

    #[tokio::test]
    async fn test_result_without_any_source() {
        let client = Arc::new(MockTorrentClient::new());
        let fetcher = Arc::new(MockTorrentFetcher::new());
        let provider = Arc::new(MockSearchProvider::new());
        let mgr = manager(client, fetcher, provider, false);

        let chosen = result_with(None, None, None);
        let attempt = mgr.download(&chosen, "/downloads").await;

        assert!(!attempt.success);
        assert!(attempt.message.contains("no magnet link"));
    }

    #[test]
    fn test_build_reconstructed_magnet() {
        let magnet = build_reconstructed_magnet("abc123", "My Release");
        assert!(magnet.starts_with("magnet:?xt=urn:btih:abc123"));
        assert!(magnet.contains("&dn=My%20Release"));
        assert_eq!(magnet.matches("&tr=").count(), PUBLIC_TRACKERS.len());
    }

    #[test]
    fn test_is_valid_torrent() {
        assert!(is_valid_torrent(b"d8:announce...", None));
        assert!(is_valid_torrent(b"xxxx", Some("application/x-bittorrent")));
        assert!(is_valid_torrent(b"xxxx", Some("application/octet-stream")));
        assert!(!is_valid_torrent(b"<html>", Some("text/html")));
        assert!(!is_valid_torrent(b"", Some("application/x-bittorrent")));
    }

    #[test]
    fn test_method_descriptions() {
        assert_eq!(DownloadMethod::Magnet.describe(), "magnet link");
        assert_eq!(DownloadMethod::TorrentFile.describe(), ".torrent file");
        assert_eq!(
            DownloadMethod::ReconstructedMagnet.describe(),
            "reconstructed magnet link"
        );
        assert_eq!(
            DownloadMethod::AlternativeSource.describe(),
            "alternative source"
        );
    }
}
