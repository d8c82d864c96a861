//! Display formatting of classified search results.
//!
//! Renders a ranked result list into a markdown text block that fits the
//! transport's message length limit. When the full list does not fit, whole
//! entries are dropped from the end (entries are never truncated
//! individually) and a "+N more" notice is appended.

use std::collections::HashMap;

use crate::classifier::{ClassifiedResult, MediaType};
use crate::config::FormatConfig;
use crate::searcher::{IndexerError, SearchMode};

/// A rendered result list.
#[derive(Debug, Clone)]
pub struct FormattedSearch {
    /// The display text, markdown-escaped and within the length limit.
    pub text: String,
    /// How many results are rendered.
    pub shown: usize,
    /// How many results the search produced.
    pub total: usize,
}

/// Characters with syntactic meaning in the output markup.
const MARKDOWN_SPECIALS: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape markdown special characters, one backslash per character.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quality tier emoji for a 0-100 score.
pub fn quality_emoji(score: u8) -> &'static str {
    if score >= 80 {
        "🔥" // Excellent
    } else if score >= 65 {
        "⭐" // Good
    } else if score >= 50 {
        "✅" // OK
    } else if score >= 35 {
        "⚠️" // Low
    } else {
        "❌" // Poor
    }
}

/// Render a ranked, classified result list.
pub fn format_results(
    items: &[ClassifiedResult],
    query: &str,
    mode: SearchMode,
    config: &FormatConfig,
) -> FormattedSearch {
    let total = items.len();
    if total == 0 {
        return FormattedSearch {
            text: format_no_results(query, mode, &[]),
            shown: 0,
            total: 0,
        };
    }

    let mut shown = total;
    loop {
        let text = render(items, shown, total, mode);
        if text.len() <= config.max_message_len || shown == 1 {
            return FormattedSearch { text, shown, total };
        }
        shown -= 1;
    }
}

/// Render the "no results" message, with indexer errors and mode-specific
/// suggestions for a broader search.
pub fn format_no_results(query: &str, mode: SearchMode, errors: &[IndexerError]) -> String {
    let mut lines = vec![format!("❌ No torrents found for: {}", escape_markdown(query))];

    if !errors.is_empty() {
        lines.push("⚠️ Some indexers errored:".to_string());
        for err in errors.iter().take(3) {
            let first_line = err.message.lines().next().unwrap_or_default();
            let brief: String = first_line.chars().take(120).collect();
            lines.push(format!("• {}: {}", err.indexer, brief));
        }
    }

    lines.push(String::new());
    match mode {
        SearchMode::Fast | SearchMode::Extended => {
            lines.push("💡 Try rich mode for a comprehensive search across configured indexers".to_string());
            lines.push("💡 Try all mode for an exhaustive search across every indexer".to_string());
            lines.push("🎵 Try music mode for a music-focused search".to_string());
        }
        SearchMode::Music => {
            lines.push("💡 Try rich or all mode for a broader search".to_string());
            lines.push("💡 Try different artist or album names".to_string());
        }
        SearchMode::Rich => {
            lines.push("💡 Try all mode for an even more comprehensive search".to_string());
            lines.push("🎵 Try music mode for music-focused results".to_string());
        }
        SearchMode::All => {
            lines.push("💡 This was the most comprehensive search possible.".to_string());
            lines.push("💡 Try different search terms or check the indexer configuration.".to_string());
        }
    }

    lines.join("\n")
}

fn mode_label(mode: SearchMode, count: usize) -> String {
    match mode {
        SearchMode::Fast | SearchMode::Extended => {
            format!("🔍 Top {} results (seeders ↓):", count)
        }
        SearchMode::Rich => format!(
            "🔍 Rich search results ({} from all configured indexers):",
            count
        ),
        SearchMode::All => format!("🌐 ALL search results ({} from EVERY indexer):", count),
        SearchMode::Music => format!("🎵 Music search results ({} from music indexers):", count),
    }
}

fn render(items: &[ClassifiedResult], shown: usize, total: usize, mode: SearchMode) -> String {
    let mut lines = Vec::new();
    lines.push(mode_label(mode, total));
    lines.push(format!("📊 **Found {} results:**", total));
    lines.extend(distribution_summary(items));
    lines.push(format!("📋 **Select by typing a number (1-{}):**", shown));
    lines.push(String::new());

    for (i, item) in items.iter().take(shown).enumerate() {
        let emoji = quality_emoji(item.media.quality_score);
        let title = escape_markdown(&item.media.raw_title);
        lines.push(format!("`{:2}.` {} **{}**", i + 1, emoji, title));
        lines.push(format!("     {}", detail_line(item)));
        lines.push(String::new());
    }

    if shown < total {
        lines.push(format!(
            "_... and {} more results (showing top {} due to length limit)_",
            total - shown,
            shown
        ));
    }

    lines.push(format!("💡 **Type the number (1-{}) to download**", shown));
    lines.join("\n")
}

/// Media-type distribution header, most common type first.
fn distribution_summary(items: &[ClassifiedResult]) -> Vec<String> {
    let mut counts: HashMap<MediaType, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.media.media_type).or_default() += 1;
    }

    let total = items.len();
    let mut entries: Vec<(MediaType, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    entries
        .into_iter()
        .map(|(media_type, count)| {
            let percentage = (count as f64 / total as f64 * 100.0).round();
            format!(
                "{} {}: {} ({:.0}%)",
                media_type.emoji(),
                media_type.as_str(),
                count,
                percentage
            )
        })
        .collect()
}

/// Type-specific detail line for one entry.
fn detail_line(item: &ClassifiedResult) -> String {
    let details = &item.media.details;
    let size = details.get("size").cloned().unwrap_or_else(|| "Unknown".to_string());
    let seeds = item.result.seeders;
    let peers = item.result.leechers;

    let mut parts: Vec<String> = Vec::new();
    match item.media.media_type {
        MediaType::Audio => {
            parts.push(size);
            if let Some(bitrate) = details.get("bitrate") {
                parts.push(format!("Bitrate: {}", bitrate));
            } else if details
                .get("format")
                .is_some_and(|f| f.eq_ignore_ascii_case("flac"))
            {
                parts.push("Bitrate: Lossless".to_string());
            }
            if let Some(tracks) = details.get("tracks") {
                parts.push(format!("Tracks: {}", tracks));
            }
            parts.push(format!("Peers: {}", peers));
            parts.push(format!("Seeds: {}", seeds));
        }
        MediaType::Movie | MediaType::Tv => {
            for key in ["year", "resolution", "source", "codec"] {
                if let Some(value) = details.get(key) {
                    parts.push(value.clone());
                }
            }
            parts.push(size);
            parts.push(format!("Seeds: {}", seeds));
        }
        MediaType::Software => {
            if let Some(version) = details.get("version") {
                parts.push(format!("v{}", version));
            }
            for key in ["os", "arch"] {
                if let Some(value) = details.get(key) {
                    parts.push(value.clone());
                }
            }
            parts.push(size);
            parts.push(format!("Seeds: {}", seeds));
        }
        MediaType::Game => {
            if let Some(group) = details.get("group").or_else(|| details.get("platform")) {
                parts.push(group.clone());
            }
            parts.push(size);
            parts.push(format!("Seeds: {}", seeds));
        }
        MediaType::Ebook | MediaType::Adult | MediaType::Other => {
            parts.push(size);
            parts.push(format!("Peers: {}", peers));
            parts.push(format!("Seeds: {}", seeds));
        }
    }

    parts.join(" | ")
}
