use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub jackett: JackettConfig,
    #[serde(default)]
    pub qbittorrent: QBittorrentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Jackett aggregator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    #[serde(default = "default_jackett_url")]
    pub url: String,
    /// Jackett API key
    #[serde(default)]
    pub api_key: String,
    /// TCP connect timeout in seconds (default: 3)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u32,
    /// Response read timeout in seconds (default: 12)
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u32,
}

impl Default for JackettConfig {
    fn default() -> Self {
        Self {
            url: default_jackett_url(),
            api_key: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

fn default_jackett_url() -> String {
    "http://jackett:9117".to_string()
}

fn default_connect_timeout() -> u32 {
    3
}

fn default_read_timeout() -> u32 {
    12
}

/// qBittorrent client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// qBittorrent WebUI URL (e.g., "http://qbittorrent:8080")
    #[serde(default = "default_qbit_url")]
    pub url: String,
    #[serde(default = "default_qbit_user")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Root directory downloads are saved under.
    #[serde(default = "default_save_root")]
    pub save_root: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_qbit_timeout")]
    pub timeout_secs: u32,
}

impl Default for QBittorrentConfig {
    fn default() -> Self {
        Self {
            url: default_qbit_url(),
            username: default_qbit_user(),
            password: String::new(),
            save_root: default_save_root(),
            timeout_secs: default_qbit_timeout(),
        }
    }
}

fn default_qbit_url() -> String {
    "http://qbittorrent:8080".to_string()
}

fn default_qbit_user() -> String {
    "admin".to_string()
}

fn default_save_root() -> String {
    "/downloads".to_string()
}

fn default_qbit_timeout() -> u32 {
    30
}

/// Search orchestration configuration: indexer lists, worker counts and
/// per-mode result limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Short list of popular, reliable indexers queried in fast mode.
    #[serde(default = "default_popular_indexers")]
    pub popular_indexers: Vec<String>,
    /// Extra indexers tried when fast mode yields poor results.
    #[serde(default = "default_fallback_indexers")]
    pub fallback_indexers: Vec<String>,
    /// Music-oriented indexers queried in music mode.
    #[serde(default = "default_music_indexers")]
    pub music_indexers: Vec<String>,
    /// Exhaustive indexer list used when the aggregator cannot be enumerated.
    #[serde(default = "default_all_indexers")]
    pub all_indexers: Vec<String>,
    /// Worker pool size for fast mode (default: 4).
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Result limit for fast mode (default: 5).
    #[serde(default = "default_fast_limit")]
    pub fast_limit: usize,
    /// Result limit for rich mode (default: 15).
    #[serde(default = "default_rich_limit")]
    pub rich_limit: usize,
    /// Result limit for all mode (default: 25).
    #[serde(default = "default_all_limit")]
    pub all_limit: usize,
    /// Result limit for music mode (default: 12).
    #[serde(default = "default_music_limit")]
    pub music_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            popular_indexers: default_popular_indexers(),
            fallback_indexers: default_fallback_indexers(),
            music_indexers: default_music_indexers(),
            all_indexers: default_all_indexers(),
            max_workers: default_max_workers(),
            fast_limit: default_fast_limit(),
            rich_limit: default_rich_limit(),
            all_limit: default_all_limit(),
            music_limit: default_music_limit(),
        }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_popular_indexers() -> Vec<String> {
    to_strings(&[
        "yts",
        "1337x",
        "thepiratebay",
        "eztv",
        "limetorrents",
        "torrentgalaxy",
        "torlock",
        "torrentdownloads",
        "linuxtracker",
        "idope",
    ])
}

fn default_fallback_indexers() -> Vec<String> {
    to_strings(&[
        "1337x",
        "rarbg",
        "thepiratebay",
        "kickasstorrents",
        "torrentgalaxy",
        "glodls",
        "magnetdl",
        "btdiggg",
    ])
}

fn default_music_indexers() -> Vec<String> {
    to_strings(&[
        // Music specialists
        "rutracker",
        "rutor",
        "noname-club",
        "torrentcore",
        "redacted",
        "orpheus",
        // Music-heavy public trackers
        "1337x",
        "thepiratebay",
        "torrentgalaxy",
        "limetorrents",
        "kickasstorrents",
        "idope",
        // Specialized audio content
        "mixtapetorrent",
        "nipponsei",
        "tokyotoshokan",
        "vsttorrentz",
        "vsthouse",
        "vstorrent",
        "torrentqq",
        // General trackers with good music sections
        "nyaa",
        "linuxtracker",
        "glodls",
        "solidtorrents",
        "zooqle",
    ])
}

fn default_all_indexers() -> Vec<String> {
    to_strings(&[
        // Movies & TV
        "1337x",
        "thepiratebay",
        "piratebay",
        "yts",
        "eztv",
        "torlock",
        "torrentgalaxyclone",
        "torrentgalaxy",
        "torrentdownloads",
        "torrentproject2",
        "torrentproject",
        "torrent9",
        "oxtorrent",
        "oxtorrent-vip",
        "limetorrents",
        "torrentkitty",
        "torrenttip",
        "divxtotal",
        "cinecalidad",
        "dontorrent",
        "elitetorrent-wf",
        "extratorrents",
        "isohunt2",
        // TV / series specialists
        "showrss",
        "skidrowrepack",
        "torrentdosfilmes",
        "torrentoyunindir",
        "torrentsir",
        "torrentsome",
        "zetorrents",
        "internetarchive",
        // Music & audio
        "rutracker",
        "rutor",
        "noname-club",
        "torrentcore",
        "mixtapetorrent",
        "nipponsei",
        "tokyotoshokan",
        "vsttorrentz",
        "vsthouse",
        "vstorrent",
        "linuxtracker",
        "torrentqq",
        // Software, games, e-books
        "gamestorrents",
        "mactorrentsdownload",
        "pc-torrent",
        "crackingpatching",
        "byrutor",
        "torrentssg",
        "ebookbay",
        "epublibre",
        "frozenlayer",
        "bt-etree",
        "megapeer",
        "plugintorrent",
        "wolfmax4k",
        "idope",
        "idopeclone",
        "kickasstorrents",
        "yourbittorrent",
        // Legacy / fallback
        "rarbg",
        "rarbgapi",
        "nyaa",
        "glodls",
        "magnetdl",
        "btdiggg",
        "zooqle",
        "torrentfunk",
        "skytorrents",
        "solidtorrents",
        // Private trackers (if configured)
        "iptorrents",
        "torrentleech",
        "passthepopcorn",
        "broadcastthenet",
        "redacted",
        "orpheus",
        "gazellegames",
        "jpopsuki",
    ])
}

fn default_max_workers() -> usize {
    4
}

fn default_fast_limit() -> usize {
    5
}

fn default_rich_limit() -> usize {
    15
}

fn default_all_limit() -> usize {
    25
}

fn default_music_limit() -> usize {
    12
}

/// Result display configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormatConfig {
    /// Maximum length of a rendered result list (default: 4096, the classic
    /// chat transport limit).
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
        }
    }
}

fn default_max_message_len() -> usize {
    4096
}

/// Download fallback configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    /// Whether to search other indexers for an equivalent release when every
    /// direct download method fails.
    #[serde(default = "default_aggressive")]
    pub aggressive: bool,
    /// Attempts when fetching a .torrent file (default: 3).
    #[serde(default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,
    /// Delay between fetch attempts in milliseconds (default: 1000).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            aggressive: default_aggressive(),
            max_fetch_attempts: default_max_fetch_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_aggressive() -> bool {
    true
}

fn default_max_fetch_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Sanitized config for display/logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub jackett: SanitizedJackettConfig,
    pub qbittorrent: SanitizedQBittorrentConfig,
    pub search: SearchConfig,
    pub format: FormatConfig,
    pub fallback: FallbackConfig,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub connect_timeout_secs: u32,
    pub read_timeout_secs: u32,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub save_root: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            jackett: SanitizedJackettConfig {
                url: config.jackett.url.clone(),
                api_key_configured: !config.jackett.api_key.is_empty(),
                connect_timeout_secs: config.jackett.connect_timeout_secs,
                read_timeout_secs: config.jackett.read_timeout_secs,
            },
            qbittorrent: SanitizedQBittorrentConfig {
                url: config.qbittorrent.url.clone(),
                username: config.qbittorrent.username.clone(),
                password_configured: !config.qbittorrent.password.is_empty(),
                save_root: config.qbittorrent.save_root.clone(),
                timeout_secs: config.qbittorrent.timeout_secs,
            },
            search: config.search.clone(),
            format: config.format.clone(),
            fallback: config.fallback.clone(),
        }
    }
}
