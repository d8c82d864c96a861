//! Normalization boundary for untyped indexer responses.
//!
//! Indexers disagree on field names and types: seeder counts arrive as
//! integers, floats, numeric strings or noisy strings under half a dozen
//! different keys. Everything "guess the field name" lives here, as total
//! functions over arbitrary JSON maps, so the rest of the crate only ever
//! sees a typed [`RawSearchResult`].

use serde_json::Value;

use super::RawSearchResult;

/// Field name variants for seeder counts, in priority order.
const SEEDER_FIELDS: [&str; 6] = [
    "Seeders",
    "seeders",
    "Seeds",
    "seeds",
    "seed_count",
    "SeedCount",
];

/// Field name variants for peer/leecher counts, in priority order.
const PEER_FIELDS: [&str; 6] = [
    "Peers",
    "peers",
    "Leechers",
    "leechers",
    "peer_count",
    "PeerCount",
];

/// Extract a seeder count from a raw indexer record.
///
/// Returns 0 when no recognized field is present or the value cannot be
/// coerced. Never panics, whatever the input shape.
pub fn seeders_of(raw: &Value) -> u32 {
    count_field(raw, &SEEDER_FIELDS)
}

/// Extract a peer/leecher count from a raw indexer record.
pub fn peers_of(raw: &Value) -> u32 {
    count_field(raw, &PEER_FIELDS)
}

fn count_field(raw: &Value, fields: &[&str]) -> u32 {
    let Some(map) = raw.as_object() else {
        return 0;
    };
    for field in fields {
        if let Some(value) = map.get(*field) {
            if let Some(count) = coerce_count(value) {
                return count;
            }
        }
    }
    0
}

/// Coerce a JSON value to a non-negative count.
///
/// Strings are stripped of non-numeric characters (keeping a leading minus)
/// before parsing; negative values clamp to 0.
fn coerce_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.max(0) as u32)
            } else {
                n.as_f64().map(|f| f.max(0.0) as u32)
            }
        }
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            cleaned.parse::<i64>().ok().map(|i| i.max(0) as u32)
        }
        _ => None,
    }
}

fn str_field(map: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    map.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn size_of(map: &serde_json::Map<String, Value>) -> u64 {
    let Some(value) = map.get("Size").or_else(|| map.get("size")) else {
        return 0;
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.max(0) as u64)
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().map(|i| i.max(0) as u64).unwrap_or(0),
        _ => 0,
    }
}

/// Normalize one raw indexer record into a typed result.
///
/// Returns `None` when the record has no usable title. The indexer name is
/// taken from the record's own `Tracker` field when present, falling back to
/// the queried indexer.
pub fn normalize_result(raw: &Value, indexer: &str) -> Option<RawSearchResult> {
    let map = raw.as_object()?;
    let title = str_field(map, "Title")?;

    Some(RawSearchResult {
        title,
        indexer: str_field(map, "Tracker").unwrap_or_else(|| indexer.to_string()),
        size_bytes: size_of(map),
        seeders: seeders_of(raw),
        leechers: peers_of(raw),
        magnet_uri: str_field(map, "MagnetUri"),
        torrent_url: str_field(map, "Link"),
        info_hash: str_field(map, "InfoHash").map(|h| h.to_lowercase()),
    })
}
