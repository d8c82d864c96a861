//! HTTP fetching of .torrent files.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// A fetched file body with its reported content type.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Errors fetching a .torrent file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("{0}")]
    Other(String),
}

/// Trait for fetching .torrent file contents from an indexer link.
#[async_trait]
pub trait TorrentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedFile, FetchError>;
}

/// Reqwest-backed fetcher. Torrent files can be slow to serve, so the read
/// timeout is fixed at 30s while the connect timeout follows the search
/// configuration.
pub struct HttpTorrentFetcher {
    client: Client,
}

impl HttpTorrentFetcher {
    pub fn new(connect_timeout_secs: u32) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs as u64))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl TorrentFetcher for HttpTorrentFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::Connection(e.to_string())
            } else {
                FetchError::Other(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?
            .to_vec();

        Ok(FetchedFile {
            bytes,
            content_type,
        })
    }
}
