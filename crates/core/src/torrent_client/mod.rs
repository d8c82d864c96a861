//! Torrent client abstraction.
//!
//! This module provides a `TorrentClient` trait covering the narrow contract
//! the download path needs (add by magnet, add by file, find a torrent), with
//! a qBittorrent WebUI implementation.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
