//! Ranking and deduplication of merged search results.

use std::collections::HashSet;

use super::RawSearchResult;

/// Identity of a result for deduplication purposes.
///
/// Two results represent the same torrent when they share a magnet URI, or
/// failing that, the same (title, size) pair. Key computation is pure so that
/// merging stays stable however indexer responses interleave.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Magnet(String),
    TitleSize(String, u64),
}

/// Compute the dedup identity key for a result.
pub fn dedup_key(result: &RawSearchResult) -> DedupKey {
    match &result.magnet_uri {
        Some(magnet) if !magnet.is_empty() => DedupKey::Magnet(magnet.clone()),
        _ => DedupKey::TitleSize(result.title.clone(), result.size_bytes),
    }
}

/// Sort results by seeders descending, title ascending (case-insensitive)
/// as the tie-break, so presentation order is deterministic for a fixed
/// input set.
pub fn sort_by_seeders(results: &mut [RawSearchResult]) {
    results.sort_by(|a, b| {
        b.seeders
            .cmp(&a.seeders)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
}

/// Remove duplicate results, keeping the first occurrence of each identity
/// key.
///
/// The input is expected to be sorted already (highest-ranked first), so the
/// kept copy is the best one. Single pass, O(n).
pub fn deduplicate(results: Vec<RawSearchResult>) -> Vec<RawSearchResult> {
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|r| seen.insert(dedup_key(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(title: &str, seeders: u32, magnet: Option<&str>) -> RawSearchResult {
        RawSearchResult {
            title: title.to_string(),
            indexer: "test".to_string(),
            size_bytes: 1000,
            seeders,
            leechers: 1,
            magnet_uri: magnet.map(|m| m.to_string()),
            torrent_url: None,
            info_hash: None,
        }
    }

    #[test]
    fn test_sort_by_seeders_descending() {
        let mut results = vec![
            make_result("Low", 5, None),
            make_result("High", 50, None),
            make_result("Medium", 20, None),
        ];
        sort_by_seeders(&mut results);

        assert_eq!(results[0].seeders, 50);
        assert_eq!(results[1].seeders, 20);
        assert_eq!(results[2].seeders, 5);
    }

    #[test]
    fn test_sort_title_tiebreak_ascending() {
        let mut results = vec![
            make_result("zebra", 10, None),
            make_result("Apple", 10, None),
            make_result("mango", 10, None),
        ];
        sort_by_seeders(&mut results);

        assert_eq!(results[0].title, "Apple");
        assert_eq!(results[1].title, "mango");
        assert_eq!(results[2].title, "zebra");
    }

    #[test]
    fn test_dedup_key_prefers_magnet() {
        let with_magnet = make_result("A", 1, Some("magnet:?xt=urn:btih:abc"));
        assert_eq!(
            dedup_key(&with_magnet),
            DedupKey::Magnet("magnet:?xt=urn:btih:abc".to_string())
        );

        let without = make_result("A", 1, None);
        assert_eq!(
            dedup_key(&without),
            DedupKey::TitleSize("A".to_string(), 1000)
        );
    }

    #[test]
    fn test_dedup_empty_magnet_falls_back_to_title_size() {
        let empty_magnet = make_result("A", 1, Some(""));
        assert_eq!(
            dedup_key(&empty_magnet),
            DedupKey::TitleSize("A".to_string(), 1000)
        );
    }

    #[test]
    fn test_dedup_by_magnet_keeps_first() {
        let mut results = vec![
            make_result("From indexer B", 5, Some("magnet:?xt=urn:btih:same")),
            make_result("From indexer A", 20, Some("magnet:?xt=urn:btih:same")),
        ];
        sort_by_seeders(&mut results);
        let deduped = deduplicate(results);

        assert_eq!(deduped.len(), 1);
        // Highest-seeder copy survives
        assert_eq!(deduped[0].seeders, 20);
    }

    #[test]
    fn test_dedup_by_title_and_size() {
        let results = vec![
            make_result("Same Title", 10, None),
            make_result("Same Title", 5, None),
            make_result("Other Title", 5, None),
        ];
        let deduped = deduplicate(results);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].seeders, 10);
    }

    #[test]
    fn test_dedup_same_title_different_size_kept() {
        let mut a = make_result("Same Title", 10, None);
        a.size_bytes = 1000;
        let mut b = make_result("Same Title", 5, None);
        b.size_bytes = 2000;

        let deduped = deduplicate(vec![a, b]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_dedup_idempotent() {
        let results = vec![
            make_result("A", 10, Some("magnet:?xt=urn:btih:one")),
            make_result("A", 8, Some("magnet:?xt=urn:btih:one")),
            make_result("B", 5, None),
            make_result("B", 5, None),
        ];
        let once = deduplicate(results);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedup_no_duplicate_keys_remain() {
        let results = vec![
            make_result("A", 10, Some("magnet:?xt=urn:btih:one")),
            make_result("B", 9, Some("magnet:?xt=urn:btih:one")),
            make_result("C", 8, None),
            make_result("C", 7, None),
        ];
        let deduped = deduplicate(results);
        let keys: Vec<DedupKey> = deduped.iter().map(dedup_key).collect();
        let unique: std::collections::HashSet<_> = keys.iter().cloned().collect();
        assert_eq!(keys.len(), unique.len());
    }
}
