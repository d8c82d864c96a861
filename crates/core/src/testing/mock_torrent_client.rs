//! Mock torrent client for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::torrent_client::{TorrentClient, TorrentClientError, TorrentHandle};

/// What kind of add was requested.
#[derive(Debug, Clone)]
pub enum RecordedAddKind {
    Magnet(String),
    TorrentFile { size: usize },
}

/// A recorded add call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAdd {
    pub kind: RecordedAddKind,
    pub save_path: String,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Track added magnets/files for assertions
/// - Fail magnet or file adds (globally, or for specific magnet URIs)
/// - Script the result of `find_torrent`
#[derive(Default)]
pub struct MockTorrentClient {
    adds: RwLock<Vec<RecordedAdd>>,
    fail_magnet: RwLock<bool>,
    fail_file: RwLock<bool>,
    fail_magnet_uris: RwLock<HashSet<String>>,
    find_result: RwLock<Option<TorrentHandle>>,
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded add calls, in order.
    pub async fn adds(&self) -> Vec<RecordedAdd> {
        self.adds.read().await.clone()
    }

    /// The magnet URIs that were successfully added.
    pub async fn magnet_adds(&self) -> Vec<String> {
        self.adds
            .read()
            .await
            .iter()
            .filter_map(|a| match &a.kind {
                RecordedAddKind::Magnet(uri) => Some(uri.clone()),
                _ => None,
            })
            .collect()
    }

    /// Sizes of the torrent files that were successfully added.
    pub async fn file_adds(&self) -> Vec<usize> {
        self.adds
            .read()
            .await
            .iter()
            .filter_map(|a| match &a.kind {
                RecordedAddKind::TorrentFile { size } => Some(*size),
                _ => None,
            })
            .collect()
    }

    /// Make every magnet add fail.
    pub async fn set_fail_magnet(&self, fail: bool) {
        *self.fail_magnet.write().await = fail;
    }

    /// Make every torrent-file add fail.
    pub async fn set_fail_file(&self, fail: bool) {
        *self.fail_file.write().await = fail;
    }

    /// Make adds of one specific magnet URI fail, others succeed.
    pub async fn fail_magnet_only_for(&self, uri: &str) {
        self.fail_magnet_uris.write().await.insert(uri.to_string());
    }

    /// Script what `find_torrent` returns.
    pub async fn set_find_result(&self, handle: Option<TorrentHandle>) {
        *self.find_result.write().await = handle;
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_magnet(&self, uri: &str, save_path: &str) -> Result<(), TorrentClientError> {
        if *self.fail_magnet.read().await {
            return Err(TorrentClientError::ApiError("magnet rejected".to_string()));
        }
        if self.fail_magnet_uris.read().await.contains(uri) {
            return Err(TorrentClientError::ApiError("magnet rejected".to_string()));
        }

        self.adds.write().await.push(RecordedAdd {
            kind: RecordedAddKind::Magnet(uri.to_string()),
            save_path: save_path.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn add_torrent_file(
        &self,
        data: Vec<u8>,
        save_path: &str,
    ) -> Result<(), TorrentClientError> {
        if *self.fail_file.read().await {
            return Err(TorrentClientError::InvalidTorrent(
                "file rejected".to_string(),
            ));
        }

        self.adds.write().await.push(RecordedAdd {
            kind: RecordedAddKind::TorrentFile { size: data.len() },
            save_path: save_path.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn find_torrent(
        &self,
        _info_hash: Option<&str>,
        _title_hint: Option<&str>,
    ) -> Result<Option<TorrentHandle>, TorrentClientError> {
        Ok(self.find_result.read().await.clone())
    }
}
