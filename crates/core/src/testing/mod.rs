//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external-service traits
//! (search provider, torrent client, torrent-file fetcher), allowing
//! end-to-end testing without real infrastructure.

mod mock_fetcher;
mod mock_provider;
mod mock_torrent_client;

pub use mock_fetcher::MockTorrentFetcher;
pub use mock_provider::{MockSearchProvider, RecordedQuery};
pub use mock_torrent_client::{MockTorrentClient, RecordedAdd, RecordedAddKind};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::searcher::{IndexerInfo, RawSearchResult};

    /// A bare result with a title, source indexer and seeder count.
    pub fn raw_result(title: &str, indexer: &str, seeders: u32) -> RawSearchResult {
        RawSearchResult {
            title: title.to_string(),
            indexer: indexer.to_string(),
            size_bytes: 1000,
            seeders,
            leechers: 1,
            magnet_uri: None,
            torrent_url: None,
            info_hash: None,
        }
    }

    /// A result carrying a magnet URI.
    pub fn raw_result_with_magnet(
        title: &str,
        indexer: &str,
        seeders: u32,
        magnet: &str,
    ) -> RawSearchResult {
        RawSearchResult {
            magnet_uri: Some(magnet.to_string()),
            ..raw_result(title, indexer, seeders)
        }
    }

    /// A result carrying a .torrent download link.
    pub fn raw_result_with_link(
        title: &str,
        indexer: &str,
        seeders: u32,
        link: &str,
    ) -> RawSearchResult {
        RawSearchResult {
            torrent_url: Some(link.to_string()),
            ..raw_result(title, indexer, seeders)
        }
    }

    /// An aggregator listing entry.
    pub fn indexer_info(id: &str, configured: bool) -> IndexerInfo {
        IndexerInfo {
            id: id.to_string(),
            title: id.to_string(),
            configured,
        }
    }
}
