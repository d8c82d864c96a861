//! qBittorrent torrent client implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{multipart, Client};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;

use super::{TorrentClient, TorrentClientError, TorrentHandle, TorrentState};

/// qBittorrent WebUI client.
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    /// Session marker (cookie jar holds the actual SID; this tracks whether
    /// login has happened, refreshed on auth failure).
    session: RwLock<bool>,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            session: RwLock::new(false),
        }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Login and mark the session as established.
    async fn login(&self) -> Result<(), TorrentClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());
        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else if e.is_connect() {
                    TorrentClientError::ConnectionFailed(e.to_string())
                } else {
                    TorrentClientError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            *self.session.write().await = true;
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TorrentClientError> {
        if *self.session.read().await {
            return Ok(());
        }
        self.login().await
    }

    /// Make an authenticated GET request, re-authenticating once on 403.
    async fn get(&self, endpoint: &str) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TorrentClientError::Timeout
            } else {
                TorrentClientError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 403 {
            warn!("qBittorrent session expired, re-authenticating");
            *self.session.write().await = false;
            self.login().await?;

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()))?;
            if !response.status().is_success() {
                return Err(TorrentClientError::ApiError(format!(
                    "HTTP {}",
                    response.status()
                )));
            }
            return response
                .text()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()));
        }

        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }

    /// Make an authenticated multipart POST request.
    async fn post_multipart(
        &self,
        endpoint: &str,
        form: multipart::Form,
    ) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else {
                    TorrentClientError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }
}

/// qBittorrent torrent info response (subset of fields we consume).
#[derive(Debug, Deserialize)]
struct QbTorrentInfo {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    dlspeed: i64,
    #[serde(default)]
    eta: i64,
    #[serde(default)]
    added_on: i64,
    #[serde(default)]
    save_path: String,
}

impl QbTorrentInfo {
    fn into_handle(self) -> TorrentHandle {
        TorrentHandle {
            hash: self.hash.to_lowercase(),
            name: self.name,
            state: parse_qb_state(&self.state),
            progress: self.progress,
            download_speed: self.dlspeed.max(0) as u64,
            eta_secs: if self.eta > 0 && self.eta < 8_640_000 {
                Some(self.eta as u64)
            } else {
                None
            },
            added_at: timestamp_to_datetime(self.added_on),
            save_path: if self.save_path.is_empty() {
                None
            } else {
                Some(self.save_path)
            },
        }
    }
}

/// Parse qBittorrent state string to TorrentState.
fn parse_qb_state(state: &str) -> TorrentState {
    match state {
        "downloading" | "forcedDL" | "metaDL" | "allocating" => TorrentState::Downloading,
        "uploading" | "forcedUP" => TorrentState::Seeding,
        "pausedDL" | "pausedUP" | "stoppedDL" | "stoppedUP" => TorrentState::Paused,
        "checkingDL" | "checkingUP" | "checkingResumeData" | "moving" => TorrentState::Checking,
        "queuedDL" | "queuedUP" => TorrentState::Queued,
        "stalledDL" | "stalledUP" => TorrentState::Stalled,
        "error" | "missingFiles" => TorrentState::Error,
        _ => TorrentState::Unknown,
    }
}

/// Convert Unix timestamp to DateTime<Utc>.
fn timestamp_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 0 {
        Utc.timestamp_opt(ts, 0).single()
    } else {
        None
    }
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn add_magnet(&self, uri: &str, save_path: &str) -> Result<(), TorrentClientError> {
        let form = multipart::Form::new()
            .text("urls", uri.to_string())
            .text("savepath", save_path.to_string());

        self.post_multipart("/api/v2/torrents/add", form).await?;
        debug!(save_path = save_path, "Magnet added to qBittorrent");
        Ok(())
    }

    async fn add_torrent_file(
        &self,
        data: Vec<u8>,
        save_path: &str,
    ) -> Result<(), TorrentClientError> {
        let file_part = multipart::Part::bytes(data)
            .file_name("file.torrent")
            .mime_str("application/x-bittorrent")
            .map_err(|e| TorrentClientError::InvalidTorrent(e.to_string()))?;

        let form = multipart::Form::new()
            .part("torrents", file_part)
            .text("savepath", save_path.to_string());

        self.post_multipart("/api/v2/torrents/add", form).await?;
        debug!(save_path = save_path, "Torrent file added to qBittorrent");
        Ok(())
    }

    async fn find_torrent(
        &self,
        info_hash: Option<&str>,
        title_hint: Option<&str>,
    ) -> Result<Option<TorrentHandle>, TorrentClientError> {
        if let Some(hash) = info_hash {
            let hash_lower = hash.to_lowercase();
            let endpoint = format!("/api/v2/torrents/info?hashes={}", hash_lower);
            let response = self.get(&endpoint).await?;
            let torrents: Vec<QbTorrentInfo> = serde_json::from_str(&response)
                .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;
            if let Some(info) = torrents.into_iter().next() {
                return Ok(Some(info.into_handle()));
            }
        }

        let response = self.get("/api/v2/torrents/info").await?;
        let torrents: Vec<QbTorrentInfo> = serde_json::from_str(&response)
            .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;

        let mut handles: Vec<TorrentHandle> =
            torrents.into_iter().map(|t| t.into_handle()).collect();
        if handles.is_empty() {
            return Ok(None);
        }

        if let Some(hint) = title_hint {
            let hint_lower = hint.to_lowercase();
            let mut named: Vec<&TorrentHandle> = handles
                .iter()
                .filter(|t| t.name.to_lowercase().contains(&hint_lower))
                .collect();
            if !named.is_empty() {
                named.sort_by(|a, b| b.added_at.cmp(&a.added_at));
                return Ok(Some(named[0].clone()));
            }
        }

        handles.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(handles.into_iter().next())
    }
}
