//! Display helpers: match highlighting and preview truncation.

use crate::search::{FieldMatch, MatchKey};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";
const ELLIPSIS: &str = "...";

/// Wrap matched ranges of `text` in `<mark>` tags.
///
/// Only `content` and `title` matches are applied. Ranges are inserted
/// back-to-front by descending start so earlier offsets stay valid;
/// overlapping ranges are applied as-is. Ranges past the end of the text
/// are clamped or skipped.
#[must_use]
pub fn highlight_matches(text: &str, matches: Option<&[FieldMatch]>) -> String {
    let Some(matches) = matches else {
        return text.to_string();
    };

    let mut ranges: Vec<(usize, usize)> = matches
        .iter()
        .filter(|m| matches!(m.key, MatchKey::Content | MatchKey::Title))
        .flat_map(|m| m.indices.iter().map(|r| (r.start, r.end)))
        .collect();

    if ranges.is_empty() {
        return text.to_string();
    }

    ranges.sort_by(|a, b| b.0.cmp(&a.0));

    let mut chars: Vec<char> = text.chars().collect();
    for (start, end) in ranges {
        if chars.is_empty() || start >= chars.len() {
            continue;
        }
        let end = end.min(chars.len() - 1);
        if start > end {
            continue;
        }

        chars.splice(end + 1..end + 1, MARK_CLOSE.chars());
        chars.splice(start..start, MARK_OPEN.chars());
    }

    chars.into_iter().collect()
}

/// Shorten `text` to at most `max_length` chars for previews.
///
/// Text that already fits is returned unchanged. Otherwise the text is cut
/// at `max_length - 3` chars so that it fits together with a trailing
/// `...`, backing up to the last space before the cut when there is one.
/// Below 3 chars only part of the ellipsis fits.
#[must_use]
pub fn truncate_content(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    if max_length < ELLIPSIS.len() {
        return ELLIPSIS[..max_length].to_string();
    }

    let budget = max_length.saturating_sub(ELLIPSIS.len());
    let cut: String = text.chars().take(budget).collect();

    let kept = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };

    format!("{}{ELLIPSIS}", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatchRange;

    fn content_match(ranges: &[(usize, usize)]) -> FieldMatch {
        FieldMatch {
            key: MatchKey::Content,
            ref_index: None,
            indices: ranges
                .iter()
                .map(|&(start, end)| MatchRange { start, end })
                .collect(),
        }
    }

    mod highlight {
        use super::*;

        #[test]
        fn no_matches_returns_text() {
            assert_eq!(highlight_matches("a rare soul", None), "a rare soul");
            assert_eq!(highlight_matches("a rare soul", Some(&[])), "a rare soul");
        }

        #[test]
        fn wraps_ranges() {
            let matches = [content_match(&[(2, 5), (7, 10)])];
            assert_eq!(
                highlight_matches("a rare soul", Some(&matches)),
                "a <mark>rare</mark> <mark>soul</mark>"
            );
        }

        #[test]
        fn ignores_author_and_tag_matches() {
            let matches = [FieldMatch {
                key: MatchKey::Author,
                ref_index: None,
                indices: vec![MatchRange { start: 0, end: 0 }],
            }];
            assert_eq!(highlight_matches("abc", Some(&matches)), "abc");
        }

        #[test]
        fn clamps_and_skips_out_of_range() {
            let matches = [content_match(&[(1, 99), (50, 60)])];
            assert_eq!(highlight_matches("abc", Some(&matches)), "a<mark>bc</mark>");
        }

        #[test]
        fn counts_chars_not_bytes() {
            let matches = [content_match(&[(0, 3)])];
            assert_eq!(
                highlight_matches("café au lait", Some(&matches)),
                "<mark>café</mark> au lait"
            );
        }
    }

    mod truncate {
        use super::*;

        #[test]
        fn short_text_unchanged() {
            assert_eq!(truncate_content("short", 10), "short");
            assert_eq!(truncate_content("exactly10!", 10), "exactly10!");
        }

        #[test]
        fn cuts_at_word_boundary() {
            let text = "Sundays belonged to the kitchen";
            let truncated = truncate_content(text, 20);

            assert_eq!(truncated, "Sundays belonged...");
            assert!(truncated.chars().count() <= 20);
        }

        #[test]
        fn hard_cut_without_spaces() {
            assert_eq!(truncate_content("abcdefghijklmnop", 8), "abcde...");
        }

        #[test]
        fn never_exceeds_max_length() {
            let text = "Tony was a rare soul.";
            for n in 0..=text.len() {
                let truncated = truncate_content(text, n);
                assert!(truncated.chars().count() <= n, "n={n} got {truncated:?}");
            }
            assert_eq!(truncate_content(text, 0), "");
            assert_eq!(truncate_content(text, 2), "..");
            assert_eq!(truncate_content(text, 3), "...");
        }

        #[test]
        fn idempotent() {
            let samples = [
                "Tony was a rare soul. He listened more than he spoke.",
                "abcdefghijklmnopqrstuvwxyz",
                "a b c d e f g h i j k l m n o p",
                "",
            ];
            for text in samples {
                for n in [0, 1, 2, 3, 5, 10, 25, 100] {
                    let once = truncate_content(text, n);
                    assert_eq!(truncate_content(&once, n), once, "text={text:?} n={n}");
                }
            }
        }
    }
}
