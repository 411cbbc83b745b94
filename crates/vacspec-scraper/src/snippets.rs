//! Evidence snippets: short word windows around keyword hits.

use vacspec_core::SpecField;

use crate::text::find_keyword;

/// Words kept before the word holding a keyword hit.
const WORDS_BEFORE: usize = 4;
/// Words kept after the word holding the end of the hit.
const WORDS_AFTER: usize = 3;

/// Collects up to `limit` distinct snippets for `field` from normalized
/// (lower-cased, whitespace-collapsed) page text.
///
/// Keywords are tried in the field's order; within a keyword, hits are taken
/// in document order. Only hits that start on a word boundary count.
#[must_use]
pub fn extract_snippets(text: &str, field: SpecField, limit: usize) -> Vec<String> {
    let mut snippets: Vec<String> = Vec::new();
    if limit == 0 || text.is_empty() {
        return snippets;
    }
    let words = word_spans(text);

    for keyword in field.keywords() {
        let mut from = 0;
        while let Some(pos) = find_keyword(text, keyword, from) {
            from = pos + keyword.len();
            if !starts_word(text, pos) {
                continue;
            }
            let Some(snippet) = window_around(text, &words, pos, pos + keyword.len()) else {
                continue;
            };
            if !snippets.contains(&snippet) {
                snippets.push(snippet);
                if snippets.len() >= limit {
                    return snippets;
                }
            }
        }
    }
    snippets
}

fn starts_word(text: &str, pos: usize) -> bool {
    !text[..pos]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
}

/// Index of the word starting at or before byte `pos`.
fn word_index(words: &[(usize, usize)], pos: usize) -> Option<usize> {
    words.partition_point(|(start, _)| *start <= pos).checked_sub(1)
}

/// Byte ranges of every whitespace-separated word.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, idx));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// Window around the hit at `start..end`. Multi-word keywords are kept whole
/// and the trailing context counts from the hit's last word.
fn window_around(
    text: &str,
    words: &[(usize, usize)],
    start: usize,
    end: usize,
) -> Option<String> {
    let first_hit = word_index(words, start)?;
    let last_hit = word_index(words, end.saturating_sub(1))?.max(first_hit);
    let first = first_hit.saturating_sub(WORDS_BEFORE);
    let last = (last_hit + WORDS_AFTER).min(words.len() - 1);

    let joined = words[first..=last]
        .iter()
        .map(|(s, e)| &text[*s..*e])
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = joined.trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '-' | '|' | '(')
    });
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_four_words_before_and_three_after() {
        let text = "one two three four five lidar navigation six seven eight nine";
        let snippets = extract_snippets(text, SpecField::Navigation, 3);
        // "navigation" is tried first, then "lidar".
        assert_eq!(
            snippets,
            vec![
                "three four five lidar navigation six seven eight",
                "two three four five lidar navigation six seven",
            ]
        );
    }

    #[test]
    fn window_is_clipped_at_text_edges_and_trailing_punctuation_dropped() {
        let snippets = extract_snippets("gyro navigation.", SpecField::Navigation, 3);
        assert_eq!(snippets, vec!["gyro navigation"]);
    }

    #[test]
    fn snippet_count_never_exceeds_limit() {
        let text = "dock a. dock b. dock c. dock d. dock e. dock f. dock g.";
        assert_eq!(extract_snippets(text, SpecField::Base, 3).len(), 3);
        assert_eq!(extract_snippets(text, SpecField::Base, 1).len(), 1);
        assert!(extract_snippets(text, SpecField::Base, 0).is_empty());
    }

    #[test]
    fn duplicate_windows_are_removed() {
        let snippets = extract_snippets("mop mop", SpecField::MopType, 3);
        assert_eq!(snippets, vec!["mop mop"]);
    }

    #[test]
    fn hits_inside_words_are_ignored() {
        // "undocked" contains "dock" but not on a word boundary.
        assert!(extract_snippets("the robot undocked quietly", SpecField::Base, 3).is_empty());
        assert!(extract_snippets("tank capacity 0.5 l", SpecField::Suction, 3).is_empty());
    }

    #[test]
    fn same_input_gives_same_output() {
        let text = "auto-empty dock and base station with wash and dry cycle";
        for field in SpecField::ALL {
            assert_eq!(extract_snippets(text, field, 3), extract_snippets(text, field, 3));
        }
    }

    #[test]
    fn multi_word_keyword_keeps_three_words_after_its_last_word() {
        let text = "the robot returns to its charging dock after cleaning every room";
        let snippets = extract_snippets(text, SpecField::Base, 3);
        // "dock" is tried before "charging dock"; both end on the same word.
        assert_eq!(
            snippets,
            vec![
                "returns to its charging dock after cleaning every",
                "robot returns to its charging dock after cleaning every",
            ]
        );

        let text = "rated at high suction power of 5000 pa in max mode";
        let snippets = extract_snippets(text, SpecField::Suction, 3);
        assert!(snippets.contains(&"rated at high suction power of 5000 pa".to_string()));
    }
}
