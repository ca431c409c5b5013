//! Keyword vocabulary and selection filtering.
//!
//! A vocabulary is derived either from emphasized spans inside note body
//! content or from the side-channel keyword feed. Both paths trim, drop
//! empties, deduplicate by exact match, and sort with Swedish collation —
//! the sort order is a correctness requirement (it fixes picker ordering
//! deterministically), not cosmetics.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CaseBody, EnrichedNote, Keyword};

/// Set of chosen keywords; empty means "no filter applied".
pub type SelectedKeywords = BTreeSet<String>;

/// Emphasized spans in note body content. Case-insensitive, spans may
/// wrap lines.
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<b\b[^>]*>(.*?)</b>").unwrap());

/// Any markup tag, for stripping nested tags out of a captured span.
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// =============================================================================
// COLLATION
// =============================================================================

/// Compare two strings under Swedish primary ordering: case-insensitive,
/// with å, ä, ö collating after z. Other characters keep scalar order;
/// exact string order breaks ties so the result is total and
/// deterministic.
pub fn swedish_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(char_rank)
        .cmp(b.chars().map(char_rank))
        .then_with(|| a.cmp(b))
}

fn char_rank(c: char) -> u32 {
    const Z: u32 = 'z' as u32;
    let lc = c.to_lowercase().next().unwrap_or(c);
    match lc {
        'å' => Z * 4 + 1,
        'ä' => Z * 4 + 2,
        'ö' => Z * 4 + 3,
        _ => (lc as u32) * 4,
    }
}

// =============================================================================
// VOCABULARY EXTRACTION
// =============================================================================

/// Collect the distinct emphasized text spans out of inline markup:
/// trimmed, empties dropped, deduplicated by exact match, Swedish-sorted.
///
/// Idempotent: re-extraction from the same input yields the same sequence.
pub fn extract_emphasized(markup: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut spans = Vec::new();
    for cap in EMPHASIS.captures_iter(markup) {
        let inner = TAG.replace_all(&cap[1], "");
        let text = inner.trim();
        if text.is_empty() {
            continue;
        }
        if seen.insert(text.to_string()) {
            spans.push(text.to_string());
        }
    }
    spans.sort_by(|a, b| swedish_cmp(a, b));
    spans
}

/// Derive a vocabulary from the side-channel keyword feed: the distinct
/// `Name` entries, trimmed, empties dropped, Swedish-sorted.
pub fn feed_vocabulary(feed: &[Keyword]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for keyword in feed {
        let name = keyword.name.trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| swedish_cmp(a, b));
    names
}

// =============================================================================
// SELECTION FILTER
// =============================================================================

/// The keyword set associated with one note: emphasized spans in its own
/// case data, plus feed entries addressed to its composition id.
pub fn note_keywords(note: &EnrichedNote, feed: &[Keyword]) -> HashSet<String> {
    let mut keywords: HashSet<String> = note
        .case_data
        .as_ref()
        .and_then(CaseBody::markup)
        .map(extract_emphasized)
        .unwrap_or_default()
        .into_iter()
        .collect();

    if let Some(id) = note.summary.composition_id.as_deref() {
        for keyword in feed.iter().filter(|k| k.composition_id == id) {
            let name = keyword.name.trim();
            if !name.is_empty() {
                keywords.insert(name.to_string());
            }
        }
    }
    keywords
}

/// Keep the notes whose keyword set intersects the selection. An empty
/// selection applies no filter: the input comes back unchanged, same
/// elements, same order. Note content is never mutated.
pub fn filter_by_selection<'a>(
    notes: &'a [EnrichedNote],
    selected: &SelectedKeywords,
    feed: &[Keyword],
) -> Vec<&'a EnrichedNote> {
    if selected.is_empty() {
        return notes.iter().collect();
    }
    notes
        .iter()
        .filter(|note| {
            let keywords = note_keywords(note, feed);
            selected.iter().any(|s| keywords.contains(s))
        })
        .collect()
}
