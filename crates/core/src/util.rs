//! Small formatting and parsing helpers shared across the crate.

/// Format a byte count as a human readable size.
pub fn human_size(num_bytes: u64) -> String {
    if num_bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = num_bytes as f64;
    let mut i = 0;
    while size >= 1024.0 && i < UNITS.len() - 1 {
        size /= 1024.0;
        i += 1;
    }
    format!("{:.2} {}", size, UNITS[i])
}

/// Format a bytes-per-second rate as a human readable speed.
pub fn human_speed(bps: u64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];
    let mut speed = bps as f64;
    let mut i = 0;
    while speed >= 1024.0 && i < UNITS.len() - 1 {
        speed /= 1024.0;
        i += 1;
    }
    format!("{:.2} {}", speed, UNITS[i])
}

/// Format an ETA in seconds as a short human readable duration.
///
/// Values that are clearly bogus (some torrent clients report huge sentinel
/// ETAs) render as "unknown".
pub fn format_eta(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) if s < 100_000_000 => {
            let h = s / 3600;
            let m = (s % 3600) / 60;
            let secs = s % 60;
            if h > 0 {
                format!("{}h {}m", h, m)
            } else if m > 0 {
                format!("{}m {}s", m, secs)
            } else {
                format!("{}s", secs)
            }
        }
        _ => "unknown".to_string(),
    }
}

/// Extract the info hash from a magnet URI, if present.
///
/// Looks for the `xt=urn:btih:` parameter and returns the hash lowercased.
/// Works for both hex and base32 encoded hashes.
pub fn extract_infohash_from_magnet(magnet: &str) -> Option<String> {
    if !magnet.starts_with("magnet:?") {
        return None;
    }
    let query = magnet.split_once('?')?.1;
    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("xt=urn:btih:") {
            if !value.is_empty() {
                return Some(value.to_lowercase());
            }
        }
    }
    None
}

/// Truncate a string to at most `max` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size_zero() {
        assert_eq!(human_size(0), "0 B");
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(512), "512.00 B");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_human_speed() {
        assert_eq!(human_speed(0), "0.00 B/s");
        assert_eq!(human_speed(1024 * 1024), "1.00 MB/s");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(Some(42)), "42s");
        assert_eq!(format_eta(Some(90)), "1m 30s");
        assert_eq!(format_eta(Some(3720)), "1h 2m");
        assert_eq!(format_eta(Some(10u64.pow(9))), "unknown");
        assert_eq!(format_eta(None), "unknown");
    }

    #[test]
    fn test_extract_infohash() {
        assert_eq!(
            extract_infohash_from_magnet("magnet:?xt=urn:btih:ABC123&dn=Test"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_infohash_from_magnet("magnet:?dn=Test&xt=urn:btih:def456"),
            Some("def456".to_string())
        );
        assert_eq!(extract_infohash_from_magnet("http://example.com"), None);
        assert_eq!(extract_infohash_from_magnet("magnet:?dn=Test"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 40), "short");
        let long = "a".repeat(50);
        let cut = truncate_chars(&long, 40);
        assert_eq!(cut.chars().count(), 40);
        assert!(cut.ends_with("..."));
    }
}
