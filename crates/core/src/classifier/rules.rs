//! Declarative classification rule tables.
//!
//! The tables are data, separate from the matching engine in the parent
//! module, so they can be tested and extended without touching control flow.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::MediaType;

/// How a matched capture is turned into a detail value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Use the capture as matched.
    Keep,
    /// Uppercase the capture ("flac" -> "FLAC").
    Upper,
    /// Capitalize the first letter ("windows" -> "Windows").
    Capitalize,
    /// Append a "k" suffix ("320" -> "320k").
    KiloSuffix,
}

/// One detail-extraction rule: regex -> details\[key\].
pub struct DetailRule {
    pub key: &'static str,
    pub pattern: Regex,
    pub transform: Transform,
}

fn rule(key: &'static str, pattern: &str, transform: Transform) -> DetailRule {
    DetailRule {
        key,
        pattern: Regex::new(pattern).expect("invalid detail rule pattern"),
        transform,
    }
}

/// Keyword indicators per media type, scored by case-insensitive substring
/// containment. Declaration order breaks score ties.
pub static TYPE_INDICATORS: Lazy<Vec<(MediaType, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            MediaType::Audio,
            vec![
                "flac",
                "mp3",
                "album",
                "discography",
                "soundtrack",
                "ost",
                "single",
                "ep",
                "compilation",
                "va",
                "various artists",
                "artist -",
            ],
        ),
        (
            MediaType::Movie,
            vec![
                "bluray", "bdrip", "dvdrip", "webrip", "movie", "film", "1080p", "720p", "4k",
                "cinema",
            ],
        ),
        (
            MediaType::Tv,
            vec![
                "season",
                "episode",
                "s01",
                "s02",
                "complete series",
                "tv show",
                "series",
                "hdtv",
            ],
        ),
        (
            MediaType::Software,
            vec![
                "software",
                "program",
                "app",
                "crack",
                "keygen",
                "patch",
                "installer",
                "portable",
                "suite",
                "adobe",
                "microsoft",
                "office",
                "photoshop",
                "windows",
                "macos",
                "pre-activated",
            ],
        ),
        (
            MediaType::Game,
            vec![
                "game", "pc game", "repack", "gog", "steam", "codex", "fitgirl", "dodi",
            ],
        ),
        (
            MediaType::Ebook,
            vec![
                "ebook",
                "epub",
                "pdf",
                "mobi",
                "kindle",
                "audiobook",
                "book",
                "novel",
            ],
        ),
        (
            MediaType::Adult,
            vec!["xxx", "adult", "porn", "18+", "nsfw"],
        ),
    ]
});

/// Audio detail rules.
pub static AUDIO_RULES: Lazy<Vec<DetailRule>> = Lazy::new(|| {
    vec![
        rule(
            "format",
            r"(?i)\b(mp3|flac|aac|m4a|ogg|wav|ape|wma)\b",
            Transform::Upper,
        ),
        rule("bitrate", r"(?i)\b(\d+)\s*kbps\b", Transform::KiloSuffix),
        rule(
            "quality",
            r"(?i)\b(320|256|192|128|v0|v2|lossless|hi-res|24bit|96khz|192khz)\b",
            Transform::Keep,
        ),
        rule("year", r"\b(19\d{2}|20\d{2})\b", Transform::Keep),
    ]
});

/// Video detail rules (movies and TV episodes alike).
pub static VIDEO_RULES: Lazy<Vec<DetailRule>> = Lazy::new(|| {
    vec![
        rule(
            "resolution",
            r"(?i)\b(4k|2160p|1080p|720p|480p|360p|1440p)\b",
            Transform::Keep,
        ),
        rule(
            "source",
            r"(?i)\b(bluray|bdrip|webrip|dvdrip|hdtv|web-dl|cam|ts|screener|hdrip)\b",
            Transform::Keep,
        ),
        rule(
            "codec",
            r"(?i)\b(x264|x265|h264|h265|hevc|xvid|divx|av1)\b",
            Transform::Upper,
        ),
        rule(
            "audio",
            r"(?i)\b(dts|ac3|aac|truehd|atmos|5\.1|7\.1|stereo)\b",
            Transform::Keep,
        ),
        rule("year", r"\b(19\d{2}|20\d{2})\b", Transform::Keep),
    ]
});

/// Software detail rules.
pub static SOFTWARE_RULES: Lazy<Vec<DetailRule>> = Lazy::new(|| {
    vec![
        rule("version", r"(?i)\bv?(\d+\.[\d.]+)\b", Transform::Keep),
        rule(
            "arch",
            r"(?i)\b(x64|x86|32bit|64bit|arm64)\b",
            Transform::Keep,
        ),
        rule(
            "os",
            r"(?i)\b(windows|macos|linux|android|ios)\b",
            Transform::Capitalize,
        ),
        rule(
            "type",
            r"(?i)\b(crack|keygen|patch|portable|installer)\b",
            Transform::Capitalize,
        ),
    ]
});

/// Ebook detail rules.
pub static EBOOK_RULES: Lazy<Vec<DetailRule>> = Lazy::new(|| {
    vec![
        rule(
            "format",
            r"(?i)\b(epub|pdf|mobi|azw3|txt)\b",
            Transform::Upper,
        ),
        rule("year", r"\b(19\d{2}|20\d{2})\b", Transform::Keep),
    ]
});

/// Season/episode markers: "S01E02", "Season 3".
pub static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bs(\d+)e(\d+)\b|\bseason\s*(\d+)\b").unwrap());

/// Artist/album split: "Artist - Album (Year)".
pub static ARTIST_ALBUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*-\s*(.+?)\s*\(?\d{4}\)?").unwrap());

/// Loose bitrate shorthand like "320k" (the explicit "kbps" form is covered
/// by the audio rule table).
pub static BITRATE_SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{2,4})k\b").unwrap());

/// Track count markers: "12 tracks", "2 CD", "disc 1".
pub static TRACK_COUNT: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+)\s*tracks?",
        r"(?i)(\d+)\s*songs?",
        r"(?i)(\d+)\s*cd",
        r"(?i)cd\s*(\d+)",
        r"(?i)disc\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Markers that indicate a low-quality release.
pub static LOW_QUALITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(cam|ts|screener|128k)\b").unwrap());

/// Clutter stripped from titles for display: bracketed/parenthetical text
/// and a trailing release-group suffix.
pub static TITLE_CLUTTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\[[^\]]*\]", r"\([^)]*\)", r"-\s*[A-Z0-9]+$"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Common tokens removed from display titles to save space.
pub static TITLE_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(1080p|720p|4k|2160p|BluRay|BDRip|WEBRip|HDTV|x264|x265|H264|H265|HEVC)\b",
        r"(?i)\b(FLAC|MP3|320|V0|24bit|96khz|192khz)\b",
        r"(?i)\b(Complete|Season|Series|Collection|Repack|Multilingual)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rule_tables_compile() {
        // Touching each Lazy forces pattern compilation.
        assert!(!AUDIO_RULES.is_empty());
        assert!(!VIDEO_RULES.is_empty());
        assert!(!SOFTWARE_RULES.is_empty());
        assert!(!EBOOK_RULES.is_empty());
        assert!(!TRACK_COUNT.is_empty());
        assert!(!TITLE_CLUTTER.is_empty());
        assert!(!TITLE_NOISE.is_empty());
        assert_eq!(TYPE_INDICATORS.len(), 7);
    }

    #[test]
    fn test_indicator_declaration_order() {
        // Tie-breaking depends on this order staying stable.
        let order: Vec<MediaType> = TYPE_INDICATORS.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            order,
            vec![
                MediaType::Audio,
                MediaType::Movie,
                MediaType::Tv,
                MediaType::Software,
                MediaType::Game,
                MediaType::Ebook,
                MediaType::Adult,
            ]
        );
    }

    #[test]
    fn test_season_episode_pattern() {
        let caps = SEASON_EPISODE.captures("Show.S02E05.1080p").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "02");
        assert_eq!(caps.get(2).unwrap().as_str(), "05");

        let caps = SEASON_EPISODE.captures("Show Season 3 Complete").unwrap();
        assert_eq!(caps.get(3).unwrap().as_str(), "3");
    }

    #[test]
    fn test_low_quality_matches_whole_words_only() {
        assert!(LOW_QUALITY.is_match("Movie 2023 CAM"));
        assert!(LOW_QUALITY.is_match("Movie TS x264"));
        assert!(LOW_QUALITY.is_match("Album 128k"));
        // "ts" inside "torrents" must not count as a marker
        assert!(!LOW_QUALITY.is_match("Best torrents collection"));
        assert!(!LOW_QUALITY.is_match("Camera Obscura"));
    }

    #[test]
    fn test_artist_album_pattern() {
        let caps = ARTIST_ALBUM
            .captures("Pink Floyd - The Wall 1979")
            .unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "Pink Floyd");
        assert_eq!(caps.get(2).unwrap().as_str(), "The Wall");
    }
}
