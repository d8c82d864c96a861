//! Mock torrent-file fetcher for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::fallback::{FetchError, FetchedFile, TorrentFetcher};

/// Mock implementation of the TorrentFetcher trait.
///
/// Responses are scripted as a queue consumed one per `fetch` call; an empty
/// queue yields an error, so an unexpected fetch shows up as a failure rather
/// than hanging a test.
#[derive(Default)]
pub struct MockTorrentFetcher {
    queue: RwLock<VecDeque<Result<FetchedFile, String>>>,
    fetched: RwLock<Vec<String>>,
}

impl MockTorrentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch response.
    pub async fn push_response(&self, file: FetchedFile) {
        self.queue.write().await.push_back(Ok(file));
    }

    /// Queue a failing fetch.
    pub async fn push_error(&self, message: &str) {
        self.queue.write().await.push_back(Err(message.to_string()));
    }

    /// How many fetches were issued.
    pub async fn fetch_count(&self) -> usize {
        self.fetched.read().await.len()
    }

    /// The URLs that were fetched, in order.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl TorrentFetcher for MockTorrentFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile, FetchError> {
        self.fetched.write().await.push(url.to_string());

        match self.queue.write().await.pop_front() {
            Some(Ok(file)) => Ok(file),
            Some(Err(message)) => Err(FetchError::Other(message)),
            None => Err(FetchError::Other("no scripted response".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_consumed_in_order() {
        let fetcher = MockTorrentFetcher::new();
        fetcher.push_error("first fails").await;
        fetcher
            .push_response(FetchedFile {
                bytes: b"d8:announce".to_vec(),
                content_type: None,
            })
            .await;

        assert!(fetcher.fetch("http://a").await.is_err());
        assert!(fetcher.fetch("http://b").await.is_ok());
        assert!(fetcher.fetch("http://c").await.is_err());

        assert_eq!(fetcher.fetch_count().await, 3);
        assert_eq!(fetcher.fetched_urls().await, vec!["http://a", "http://b", "http://c"]);
    }
}
