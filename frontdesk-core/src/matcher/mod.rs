//! Name matching over the live roster
//!
//! Given a raw query and the current records, produce either a bounded
//! suggestion list for incremental typing or a full match list for an
//! explicit search. Matching is case-insensitive substring containment,
//! with the query additionally folded hiragana→katakana so either script
//! finds katakana-recorded names. No fuzzy matching.

pub mod cursor;
pub mod kana;

use std::collections::HashSet;
use std::ops::Range;

use tracing::trace;

use crate::roster::record::AttendeeRecord;

/// Suggestion lists are capped; a full search is unbounded.
pub const SUGGESTION_LIMIT: usize = 10;

/// A query prepared for matching: trimmed, plus its katakana folding.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    folded: String,
}

impl Query {
    pub fn new(input: &str) -> Self {
        let raw = input.trim().to_string();
        let folded = kana::hiragana_to_katakana(&raw);
        Query { raw, folded }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when a record's name fields contain this query: kanji against
    /// the raw form, kana against either the raw or the folded form.
    pub fn matches(&self, record: &AttendeeRecord) -> bool {
        find_ci(&record.kanji, &self.raw).is_some()
            || find_ci(&record.kana, &self.raw).is_some()
            || find_ci(&record.kana, &self.folded).is_some()
    }
}

/// Case-insensitive substring search returning the byte range of the
/// match within `haystack`. Empty needles never match.
fn find_ci(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    for (start, _) in haystack.char_indices() {
        let mut remaining = needle_lower.as_slice();
        let mut end = start;
        'candidate: for c in haystack[start..].chars() {
            for lc in c.to_lowercase() {
                match remaining.split_first() {
                    Some((&expected, rest)) if lc == expected => remaining = rest,
                    _ => break 'candidate,
                }
            }
            end += c.len_utf8();
            if remaining.is_empty() {
                return Some(start..end);
            }
        }
    }
    None
}

/// Matched byte spans within a record's name fields, for highlighting.
/// The kana span uses the folded query whenever folding changed the raw
/// query, so hiragana input highlights the katakana it found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightSpans {
    pub kanji: Option<Range<usize>>,
    pub kana: Option<Range<usize>>,
}

pub fn highlight_spans(record: &AttendeeRecord, query: &Query) -> HighlightSpans {
    let kana_span = if query.folded != query.raw {
        find_ci(&record.kana, &query.folded)
    } else {
        find_ci(&record.kana, &query.raw)
    };
    HighlightSpans {
        kanji: find_ci(&record.kanji, &query.raw),
        kana: kana_span,
    }
}

/// Ordered, de-duplicated suggestion list for incremental typing, capped
/// at [`SUGGESTION_LIMIT`]. First occurrence of a name pair wins;
/// insertion order is preserved.
pub fn suggest<'a>(records: &'a [AttendeeRecord], query: &Query) -> Vec<&'a AttendeeRecord> {
    collect_matches(records, query, Some(SUGGESTION_LIMIT))
}

/// Full match list for an explicit search submission. Same predicate and
/// de-duplication as suggestions, unbounded. An empty query yields an
/// empty result, which is distinct from "query matched nothing" - only
/// the latter invites a new registration.
pub fn search<'a>(records: &'a [AttendeeRecord], query: &Query) -> Vec<&'a AttendeeRecord> {
    collect_matches(records, query, None)
}

fn collect_matches<'a>(
    records: &'a [AttendeeRecord],
    query: &Query,
    limit: Option<usize>,
) -> Vec<&'a AttendeeRecord> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for record in records {
        if !query.matches(record) {
            continue;
        }
        if !seen.insert(record.dedup_key()) {
            continue;
        }
        matches.push(record);
        if limit.is_some_and(|cap| matches.len() >= cap) {
            break;
        }
    }
    trace!(
        "query '{}' matched {} record(s)",
        query.raw,
        matches.len()
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::record::{AttendanceState, RecordId, RegistrationKind};
    use pretty_assertions::assert_eq;

    fn record(id: u64, kanji: &str, kana: &str) -> AttendeeRecord {
        AttendeeRecord {
            id: RecordId(id),
            kanji: kanji.to_string(),
            kana: kana.to_string(),
            program: "希望なし".to_string(),
            first_choice: String::new(),
            second_choice: String::new(),
            third_choice: String::new(),
            registration: RegistrationKind::PreRegistered,
            attendance: AttendanceState::Pending,
        }
    }

    #[test]
    fn test_kanji_substring_match() {
        let records = vec![record(1, "田中太郎", "タナカタロウ")];
        let hits = search(&records, &Query::new("田中"));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_hiragana_query_finds_katakana_kana() {
        let records = vec![record(1, "田中太郎", "タナカタロウ")];
        let hits = suggest(&records, &Query::new("たなか"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kanji, "田中太郎");
    }

    #[test]
    fn test_katakana_query_matches_directly() {
        let records = vec![record(1, "田中太郎", "タナカタロウ")];
        assert_eq!(search(&records, &Query::new("タナカ")).len(), 1);
    }

    #[test]
    fn test_ascii_match_is_case_insensitive() {
        let records = vec![record(1, "John Smith", "スミス")];
        assert_eq!(search(&records, &Query::new("john")).len(), 1);
        assert_eq!(search(&records, &Query::new("SMITH")).len(), 1);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let records = vec![record(1, "田中太郎", "タナカタロウ")];
        assert!(search(&records, &Query::new("")).is_empty());
        assert!(search(&records, &Query::new("   ")).is_empty());
        assert!(suggest(&records, &Query::new("")).is_empty());
    }

    #[test]
    fn test_suggestion_cap_at_ten() {
        let records: Vec<_> = (0..15)
            .map(|i| record(i, &format!("田中{i}"), &format!("タナカ{i}")))
            .collect();
        let hits = suggest(&records, &Query::new("田中"));
        assert_eq!(hits.len(), SUGGESTION_LIMIT);
        // Insertion order among matches.
        assert_eq!(hits[0].kanji, "田中0");
        assert_eq!(hits[9].kanji, "田中9");

        // A full search is unbounded.
        assert_eq!(search(&records, &Query::new("田中")).len(), 15);
    }

    #[test]
    fn test_duplicate_name_pairs_collapse() {
        let records = vec![
            record(1, "田中太郎", "タナカタロウ"),
            record(2, "田中太郎", "タナカタロウ"),
            record(3, "田中次郎", "タナカジロウ"),
        ];
        let hits = search(&records, &Query::new("田中"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, RecordId(1));

        let hits = suggest(&records, &Query::new("田中"));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_highlight_spans_raw_and_folded() {
        let rec = record(1, "田中太郎", "タナカタロウ");
        let query = Query::new("たなか");
        let spans = highlight_spans(&rec, &query);
        assert_eq!(spans.kanji, None);
        // タナカ is the first three chars of the kana field.
        assert_eq!(spans.kana, Some(0.."タナカ".len()));

        let query = Query::new("田中");
        let spans = highlight_spans(&rec, &query);
        assert_eq!(spans.kanji, Some(0.."田中".len()));
    }

    #[test]
    fn test_find_ci_returns_original_byte_range() {
        let span = find_ci("John Smith", "smith").unwrap();
        assert_eq!(&"John Smith"[span], "Smith");
    }
}
