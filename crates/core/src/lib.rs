pub mod classifier;
pub mod config;
pub mod fallback;
pub mod formatter;
pub mod metrics;
pub mod searcher;
pub mod service;
pub mod session;
pub mod testing;
pub mod torrent_client;
pub mod util;

pub use classifier::{classify, classify_results, ClassifiedResult, MediaInfo, MediaType};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FallbackConfig,
    FormatConfig, JackettConfig, QBittorrentConfig, SanitizedConfig, SearchConfig,
};
pub use fallback::{
    DownloadAttempt, DownloadMethod, FallbackManager, HttpTorrentFetcher, TorrentFetcher,
};
pub use formatter::{format_results, FormattedSearch};
pub use searcher::{
    IndexerError, IndexerInfo, JackettProvider, RawSearchResult, SearchError, SearchMode,
    SearchOrchestrator, SearchOutcome, SearchProgress, SearchProvider,
};
pub use service::{SearchFlags, ServiceError, TorrentService};
pub use session::{SessionEntry, SessionStore, UserId};
pub use torrent_client::{QBittorrentClient, TorrentClient, TorrentClientError, TorrentHandle};
