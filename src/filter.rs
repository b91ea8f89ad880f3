// src/filter.rs
//! Quality filter: removes degenerate items before scoring. Length floors,
//! a Latin character-set check on titles, and pairwise near-duplicate removal
//! by normalized edit-distance similarity.

use metrics::counter;
use strsim::levenshtein;

use crate::ingest::types::ContentItem;

pub const MIN_TITLE_CHARS: usize = 10;
pub const MIN_DESCRIPTION_CHARS: usize = 50;
pub const DUPLICATE_SIMILARITY: f64 = 0.8;

/// `1 - editDistance / max(len)` over lowercased titles; 1.0 for two empties.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(&a, &b) as f64 / max_len as f64)
}

fn is_latin_title(title: &str) -> bool {
    let sample: Vec<char> = title.chars().take(50).collect();
    if sample.is_empty() {
        return false;
    }
    let ascii = sample.iter().filter(|c| c.is_ascii()).count();
    ascii as f64 / sample.len() as f64 >= 0.8
}

/// Drop too-short, non-Latin-titled and near-duplicate items. O(n²) pairwise
/// dedup is acceptable at the expected batch sizes (tens to low hundreds).
/// The first-encountered of a duplicate pair survives.
pub fn quality_filter(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let before = items.len();
    let mut kept: Vec<ContentItem> = Vec::with_capacity(items.len());

    for item in items {
        if item.title.chars().count() < MIN_TITLE_CHARS
            || item.description.chars().count() < MIN_DESCRIPTION_CHARS
        {
            continue;
        }
        if !is_latin_title(&item.title) {
            continue;
        }
        if kept
            .iter()
            .any(|k| title_similarity(&k.title, &item.title) > DUPLICATE_SIMILARITY)
        {
            continue;
        }
        kept.push(item);
    }

    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::info!(before, dropped, "quality filter pass");
    }
    counter!("digest_filtered_total").increment(dropped as u64);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::ContentKind;

    fn item(title: &str, description: &str) -> ContentItem {
        ContentItem::new(
            title.to_string(),
            description.to_string(),
            None,
            "Test".to_string(),
            "test.example".to_string(),
            None,
            ContentKind::Blog,
        )
    }

    const GOOD_DESC: &str =
        "A description comfortably longer than the fifty character floor for retention.";

    #[test]
    fn short_title_or_description_is_dropped() {
        let kept = quality_filter(vec![
            item("Too short", GOOD_DESC),
            item("A perfectly fine long title", "short desc"),
            item("A perfectly fine long title", GOOD_DESC),
        ]);
        assert_eq!(kept.len(), 1);
        assert!(kept.iter().all(|i| i.title.chars().count() >= MIN_TITLE_CHARS
            && i.description.chars().count() >= MIN_DESCRIPTION_CHARS));
    }

    #[test]
    fn non_latin_title_is_dropped() {
        let kept = quality_filter(vec![
            item("Это полностью русский заголовок новости", GOOD_DESC),
            item("An ordinary English headline", GOOD_DESC),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "An ordinary English headline");
    }

    #[test]
    fn punctuation_variant_duplicate_keeps_exactly_one() {
        let kept = quality_filter(vec![
            item("AI Update: the weekly roundup!", GOOD_DESC),
            item("AI Update: the weekly roundup", GOOD_DESC),
        ]);
        assert_eq!(kept.len(), 1, "only one of a near-duplicate pair survives");
        // First encountered wins.
        assert!(kept[0].title.ends_with('!'));
    }

    #[test]
    fn distinct_titles_both_survive() {
        let kept = quality_filter(vec![
            item("Anthropic ships a new interpretability paper", GOOD_DESC),
            item("DeepMind tackles weather forecasting with ML", GOOD_DESC),
        ]);
        assert_eq!(kept.len(), 2);
        for a in &kept {
            for b in &kept {
                if a.title != b.title {
                    assert!(title_similarity(&a.title, &b.title) <= DUPLICATE_SIMILARITY);
                }
            }
        }
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        let s = title_similarity("AI Update!", "AI Update");
        assert!(s > DUPLICATE_SIMILARITY);
        assert!((0.0..=1.0).contains(&s));
        assert_eq!(
            title_similarity("abc", "abcd"),
            title_similarity("abcd", "abc")
        );
    }
}
