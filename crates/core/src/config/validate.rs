use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Jackett and qBittorrent URLs are non-empty
/// - Per-mode result limits are nonzero
/// - Fallback fetch attempts are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.jackett.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "jackett.url cannot be empty".to_string(),
        ));
    }

    if config.qbittorrent.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "qbittorrent.url cannot be empty".to_string(),
        ));
    }

    let limits = [
        ("search.fast_limit", config.search.fast_limit),
        ("search.rich_limit", config.search.rich_limit),
        ("search.all_limit", config.search.all_limit),
        ("search.music_limit", config.search.music_limit),
    ];
    for (name, value) in limits {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                name
            )));
        }
    }

    if config.search.max_workers == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_workers cannot be 0".to_string(),
        ));
    }

    if config.fallback.max_fetch_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "fallback.max_fetch_attempts cannot be 0".to_string(),
        ));
    }

    Ok(())
}
