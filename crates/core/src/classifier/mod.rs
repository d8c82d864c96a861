//! Heuristic media classification of torrent release titles.
//!
//! `classify` never fails: any title maps to a [`MediaInfo`] with a media
//! type, a quality score in [0, 100], the detail keys that matched, and a
//! cleaned display title. Classification is deterministic in its inputs and
//! recomputed on each format pass.

pub mod rules;

mod types;

use std::collections::HashMap;

use regex_lite::Regex;

use crate::searcher::RawSearchResult;
use crate::util::{human_size, truncate_chars};

pub use types::{ClassifiedResult, MediaInfo, MediaType};

use rules::{DetailRule, Transform};

/// Maximum length of a cleaned display title.
const DISPLAY_TITLE_MAX: usize = 40;

/// Classify a release title into a media category with extracted details.
pub fn classify(title: &str, size: u64, seeders: u32, leechers: u32) -> MediaInfo {
    let media_type = detect_media_type(title);
    let details = extract_details(title, media_type, size, seeders, leechers);
    let quality_score = quality_score(title, media_type, seeders);
    let clean = clean_title(title);

    MediaInfo {
        media_type,
        title: clean,
        details,
        quality_score,
        raw_title: title.to_string(),
    }
}

/// Classify one search result.
pub fn classify_result(result: RawSearchResult) -> ClassifiedResult {
    let media = classify(
        &result.title,
        result.size_bytes,
        result.seeders,
        result.leechers,
    );
    ClassifiedResult { result, media }
}

/// Classify a ranked result list, preserving order.
pub fn classify_results(results: Vec<RawSearchResult>) -> Vec<ClassifiedResult> {
    results.into_iter().map(classify_result).collect()
}

/// Score each media type by keyword-indicator hits and pick the best.
///
/// Ties break toward the earlier entry in the indicator table; a zero score
/// everywhere lands on `Other`.
fn detect_media_type(title: &str) -> MediaType {
    let title_lower = title.to_lowercase();

    let mut best = MediaType::Other;
    let mut best_score = 0usize;
    for (media_type, indicators) in rules::TYPE_INDICATORS.iter() {
        let score = indicators
            .iter()
            .filter(|word| title_lower.contains(*word))
            .count();
        if score > best_score {
            best = *media_type;
            best_score = score;
        }
    }
    best
}

/// Run the type-specific rule tables, populating only the keys that matched,
/// plus the size/seeds/peers entries every result carries.
fn extract_details(
    title: &str,
    media_type: MediaType,
    size: u64,
    seeders: u32,
    leechers: u32,
) -> HashMap<String, String> {
    let mut details = HashMap::new();
    details.insert(
        "size".to_string(),
        if size > 0 {
            human_size(size)
        } else {
            "Unknown".to_string()
        },
    );
    details.insert("seeds".to_string(), seeders.to_string());
    details.insert("peers".to_string(), leechers.to_string());

    match media_type {
        MediaType::Audio => {
            apply_rules(title, &rules::AUDIO_RULES, &mut details);
            extract_bitrate_shorthand(title, &mut details);
            extract_artist_album(title, &mut details);
            extract_track_count(title, &mut details);
        }
        MediaType::Movie => {
            apply_rules(title, &rules::VIDEO_RULES, &mut details);
        }
        MediaType::Tv => {
            extract_season_episode(title, &mut details);
            apply_rules(title, &rules::VIDEO_RULES, &mut details);
        }
        MediaType::Software => {
            apply_rules(title, &rules::SOFTWARE_RULES, &mut details);
        }
        MediaType::Game => {
            extract_game_group(title, &mut details);
            apply_rules(title, &rules::SOFTWARE_RULES, &mut details);
        }
        MediaType::Ebook => {
            apply_rules(title, &rules::EBOOK_RULES, &mut details);
        }
        MediaType::Adult | MediaType::Other => {}
    }

    details
}

/// Generic rule-table engine: first match per key wins.
fn apply_rules(title: &str, table: &[DetailRule], details: &mut HashMap<String, String>) {
    for rule in table {
        if details.contains_key(rule.key) {
            continue;
        }
        if let Some(caps) = rule.pattern.captures(title) {
            // First participating capture group, or the whole match
            let mut captured = "";
            for group in 1..caps.len() {
                if let Some(m) = caps.get(group) {
                    captured = m.as_str();
                    break;
                }
            }
            if captured.is_empty() {
                captured = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            }
            if captured.is_empty() {
                continue;
            }
            details.insert(rule.key.to_string(), apply_transform(captured, rule.transform));
        }
    }
}

fn apply_transform(value: &str, transform: Transform) -> String {
    match transform {
        Transform::Keep => value.to_string(),
        Transform::Upper => value.to_uppercase(),
        Transform::Capitalize => {
            let mut chars = value.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
        Transform::KiloSuffix => format!("{}k", value),
    }
}

fn extract_bitrate_shorthand(title: &str, details: &mut HashMap<String, String>) {
    if details.contains_key("bitrate") {
        return;
    }
    if let Some(caps) = rules::BITRATE_SHORTHAND.captures(title) {
        details.insert("bitrate".to_string(), format!("{}k", &caps[1]));
    }
}

fn extract_artist_album(title: &str, details: &mut HashMap<String, String>) {
    if let Some(caps) = rules::ARTIST_ALBUM.captures(title) {
        details.insert("artist".to_string(), caps[1].trim().to_string());
        details.insert("album".to_string(), caps[2].trim().to_string());
    }
}

fn extract_track_count(title: &str, details: &mut HashMap<String, String>) {
    for pattern in rules::TRACK_COUNT.iter() {
        if let Some(caps) = pattern.captures(title) {
            details.insert("tracks".to_string(), caps[1].to_string());
            return;
        }
    }
}

fn extract_season_episode(title: &str, details: &mut HashMap<String, String>) {
    if let Some(caps) = rules::SEASON_EPISODE.captures(title) {
        match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(season), Some(episode), _) => {
                details.insert("season".to_string(), format!("S{:0>2}", season.as_str()));
                details.insert("episode".to_string(), format!("E{:0>2}", episode.as_str()));
            }
            (_, _, Some(season)) => {
                details.insert("season".to_string(), format!("S{:0>2}", season.as_str()));
            }
            _ => {}
        }
    }
}

fn extract_game_group(title: &str, details: &mut HashMap<String, String>) {
    let lower = title.to_lowercase();
    if lower.contains("fitgirl") {
        details.insert("group".to_string(), "FitGirl".to_string());
    } else if lower.contains("dodi") {
        details.insert("group".to_string(), "DODI".to_string());
    } else if lower.contains("codex") {
        details.insert("group".to_string(), "CODEX".to_string());
    } else if lower.contains("gog") {
        details.insert("platform".to_string(), "GOG".to_string());
    } else if lower.contains("steam") {
        details.insert("platform".to_string(), "Steam".to_string());
    }
}

/// Compute a 0-100 quality score from swarm health and title markers.
fn quality_score(title: &str, media_type: MediaType, seeders: u32) -> u8 {
    let mut score: i32 = 50;
    let lower = title.to_lowercase();

    // Seeder bonus, 2 points each, capped at 25
    if seeders > 0 {
        score += 25.min(seeders as i32 * 2);
    }

    match media_type {
        MediaType::Audio => {
            if lower.contains("flac") || lower.contains("lossless") {
                score += 15;
            } else if title.contains("320") || lower.contains("v0") {
                score += 10;
            } else if title.contains("256") {
                score += 5;
            }
        }
        MediaType::Movie | MediaType::Tv => {
            if lower.contains("4k") || title.contains("2160p") {
                score += 15;
            } else if title.contains("1080p") {
                score += 10;
            } else if title.contains("720p") {
                score += 5;
            }

            if lower.contains("bluray") {
                score += 10;
            } else if lower.contains("webrip") || lower.contains("web-dl") {
                score += 5;
            }
        }
        _ => {}
    }

    if rules::LOW_QUALITY.is_match(title) {
        score -= 20;
    }

    score.clamp(0, 100) as u8
}

/// Strip clutter from a title for display and truncate it.
fn clean_title(title: &str) -> String {
    let mut cleaned = title.to_string();

    for pattern in rules::TITLE_CLUTTER.iter() {
        cleaned = replace_all(pattern, &cleaned);
    }
    for pattern in rules::TITLE_NOISE.iter() {
        cleaned = replace_all(pattern, &cleaned);
    }

    let collapsed = rules::WHITESPACE.replace_all(&cleaned, " ");
    truncate_chars(collapsed.trim(), DISPLAY_TITLE_MAX)
}

fn replace_all(pattern: &Regex, text: &str) -> String {
    pattern.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_audio_flac_release() {
        let info = classify(
            "Pink Floyd - The Wall [FLAC 24bit/96kHz] (2011 Remaster)",
            1_000_000,
            25,
            3,
        );

        assert_eq!(info.media_type, MediaType::Audio);
        assert_eq!(info.details.get("format").map(String::as_str), Some("FLAC"));
        assert_eq!(
            info.details.get("artist").map(String::as_str),
            Some("Pink Floyd")
        );
        // Bracketed and parenthetical segments are stripped from the display title
        assert!(!info.title.contains('['));
        assert!(!info.title.contains('('));
        assert!(info.title.starts_with("Pink Floyd - The Wall"));
        assert_eq!(
            info.raw_title,
            "Pink Floyd - The Wall [FLAC 24bit/96kHz] (2011 Remaster)"
        );
    }

    #[test]
    fn test_classify_movie_with_details() {
        let info = classify(
            "Inception 2010 1080p BluRay x264 DTS-GROUP",
            2_000_000_000,
            80,
            10,
        );

        assert_eq!(info.media_type, MediaType::Movie);
        assert_eq!(
            info.details.get("resolution").map(String::as_str),
            Some("1080p")
        );
        assert_eq!(info.details.get("source").map(String::as_str), Some("BluRay"));
        assert_eq!(info.details.get("codec").map(String::as_str), Some("X264"));
        assert_eq!(info.details.get("year").map(String::as_str), Some("2010"));
        assert_eq!(info.details.get("size").map(String::as_str), Some("1.86 GB"));
    }

    #[test]
    fn test_classify_tv_season_episode() {
        let info = classify("Breaking Bad S02E07 720p HDTV x264", 500_000_000, 40, 4);

        assert_eq!(info.media_type, MediaType::Tv);
        assert_eq!(info.details.get("season").map(String::as_str), Some("S02"));
        assert_eq!(info.details.get("episode").map(String::as_str), Some("E07"));
        assert_eq!(
            info.details.get("resolution").map(String::as_str),
            Some("720p")
        );
    }

    #[test]
    fn test_classify_tv_season_only() {
        let info = classify("Some Show Season 2 Complete HDTV", 0, 1, 0);
        assert_eq!(info.media_type, MediaType::Tv);
        assert_eq!(info.details.get("season").map(String::as_str), Some("S02"));
        assert!(!info.details.contains_key("episode"));
    }

    #[test]
    fn test_classify_software() {
        let info = classify(
            "Adobe Photoshop 2024 v25.1.0 x64 Pre-Activated Windows",
            3_000_000_000,
            15,
            2,
        );

        assert_eq!(info.media_type, MediaType::Software);
        assert_eq!(
            info.details.get("version").map(String::as_str),
            Some("25.1.0")
        );
        assert_eq!(info.details.get("arch").map(String::as_str), Some("x64"));
        assert_eq!(info.details.get("os").map(String::as_str), Some("Windows"));
    }

    #[test]
    fn test_classify_game_repack_group() {
        let info = classify("Elden Ring [FitGirl Repack]", 50_000_000_000, 200, 30);

        assert_eq!(info.media_type, MediaType::Game);
        assert_eq!(info.details.get("group").map(String::as_str), Some("FitGirl"));
    }

    #[test]
    fn test_classify_ebook() {
        let info = classify("The Winds of Winter 2023 EPUB ebook", 10_000_000, 5, 0);

        assert_eq!(info.media_type, MediaType::Ebook);
        assert_eq!(info.details.get("format").map(String::as_str), Some("EPUB"));
        assert_eq!(info.details.get("year").map(String::as_str), Some("2023"));
    }

    #[test]
    fn test_classify_unrecognized_is_other() {
        let info = classify("completely unremarkable name", 0, 0, 0);
        assert_eq!(info.media_type, MediaType::Other);
        // Only the always-present entries remain
        assert_eq!(info.details.get("size").map(String::as_str), Some("Unknown"));
        assert_eq!(info.details.get("seeds").map(String::as_str), Some("0"));
        assert_eq!(info.details.get("peers").map(String::as_str), Some("0"));
        assert_eq!(info.details.len(), 3);
    }

    #[test]
    fn test_quality_score_bounds() {
        let high = classify("Artist - Best Of [FLAC lossless]", 0, 1000, 0);
        assert!(high.quality_score <= 100);

        for title in ["anything", "Movie 1080p BluRay", "Album FLAC", "Bad CAM"] {
            let info = classify(title, 0, 7, 2);
            assert!(info.quality_score <= 100);
        }
    }

    #[test]
    fn test_quality_score_seeder_bonus_caps() {
        let few = classify("plain title", 0, 3, 0);
        assert_eq!(few.quality_score, 56); // 50 + 3*2

        let many = classify("plain title", 0, 500, 0);
        assert_eq!(many.quality_score, 75); // 50 + capped 25
    }

    #[test]
    fn test_quality_score_low_quality_penalty() {
        let cam = classify("Big Movie 2024 CAM", 0, 0, 0);
        assert_eq!(cam.quality_score, 30); // 50 - 20, no bonuses

        // "ts" inside a word is not a marker
        let fine = classify("Best torrents pack", 0, 0, 0);
        assert_eq!(fine.quality_score, 50);
    }

    #[test]
    fn test_quality_score_audio_bonuses() {
        let flac = classify("Artist - Album FLAC", 0, 0, 0);
        assert_eq!(flac.quality_score, 65); // 50 + 15

        let mp3_320 = classify("Artist - Album MP3 320", 0, 0, 0);
        assert_eq!(mp3_320.quality_score, 60); // 50 + 10
    }

    #[test]
    fn test_quality_score_video_bonuses() {
        let uhd = classify("Movie 2160p BluRay", 0, 0, 0);
        assert_eq!(uhd.quality_score, 75); // 50 + 15 + 10
    }

    #[test]
    fn test_clean_title_strips_and_truncates() {
        let info = classify(
            "Some Extremely Long Release Name That Goes On And On Forever 1080p x264 [TAG] (extra)",
            0,
            0,
            0,
        );
        assert!(info.title.chars().count() <= 40);
        assert!(!info.title.contains("1080p"));
        assert!(!info.title.contains('['));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let a = classify("Show S01E01 720p HDTV", 100, 12, 3);
        let b = classify("Show S01E01 720p HDTV", 100, 12, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_classify_results_preserves_order() {
        let results = vec![
            RawSearchResult {
                title: "First".to_string(),
                indexer: "x".to_string(),
                size_bytes: 0,
                seeders: 10,
                leechers: 0,
                magnet_uri: None,
                torrent_url: None,
                info_hash: None,
            },
            RawSearchResult {
                title: "Second".to_string(),
                indexer: "x".to_string(),
                size_bytes: 0,
                seeders: 5,
                leechers: 0,
                magnet_uri: None,
                torrent_url: None,
                info_hash: None,
            },
        ];

        let classified = classify_results(results);
        assert_eq!(classified[0].result.title, "First");
        assert_eq!(classified[1].result.title, "Second");
    }
}
