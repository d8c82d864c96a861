//! Types for media classification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::searcher::RawSearchResult;

/// Media category inferred from a release title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Audio,
    Movie,
    Tv,
    Software,
    Game,
    Ebook,
    Adult,
    Other,
}

impl MediaType {
    /// Returns the string representation for display/serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Software => "software",
            MediaType::Game => "game",
            MediaType::Ebook => "ebook",
            MediaType::Adult => "adult",
            MediaType::Other => "other",
        }
    }

    /// Emoji used when summarizing type distribution.
    pub fn emoji(&self) -> &'static str {
        match self {
            MediaType::Audio => "🎵",
            MediaType::Movie => "🎬",
            MediaType::Tv => "📺",
            MediaType::Software => "💻",
            MediaType::Game => "🎮",
            MediaType::Ebook => "📚",
            MediaType::Adult => "🔞",
            MediaType::Other => "📄",
        }
    }
}

/// Parsed media information, derived deterministically from a result's
/// title/size/seeders. Recomputed on each format pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub media_type: MediaType,
    /// Cleaned display title (clutter stripped, truncated).
    pub title: String,
    /// Category-specific attributes; only keys that matched are present.
    pub details: HashMap<String, String>,
    /// 0-100 rating from quality indicators and swarm health.
    pub quality_score: u8,
    /// The original, unmodified title.
    pub raw_title: String,
}

/// A search result paired with its classification.
#[derive(Debug, Clone)]
pub struct ClassifiedResult {
    pub result: RawSearchResult,
    pub media: MediaInfo,
}
