//! Approximate word matching used by the weighted search index.
//!
//! Each query token is compared against every word of a field and the
//! closest word wins. Scores live in `[0, 1]`, lower is better:
//!
//! | match                         | score                        |
//! |-------------------------------|------------------------------|
//! | exact word                    | 0.0                          |
//! | prefix (2+ chars)             | 0.1                          |
//! | infix (3+ chars)              | 0.2                          |
//! | within edit bound (4+ chars)  | 0.1 + edits / token length   |
//! | in-order subsequence (3+)     | 1 - token length / word length |
//! | nothing                       | 1.0                          |
//!
//! A token counts for a field only when its best word scores at or below
//! the threshold. A field's score is the mean over the tokens it matched,
//! and the tokens it missed are reported so the caller can penalise them
//! once per record.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::search::{DEFAULT_THRESHOLD, MatchRange};

const PREFIX_SCORE: f64 = 0.1;
const INFIX_SCORE: f64 = 0.2;
const EDIT_BASE_SCORE: f64 = 0.1;
const NO_MATCH_SCORE: f64 = 1.0;

/// A lowercased word with its position in the source text, in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub start: usize,
    pub len: usize,
}

impl Word {
    fn end(&self) -> usize {
        self.start + self.len - 1
    }
}

/// Split text into lowercase alphanumeric words.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut len = 0;

    for (i, c) in text.chars().enumerate() {
        if c.is_alphanumeric() {
            if len == 0 {
                start = i;
            }
            current.extend(c.to_lowercase());
            len += 1;
        } else if len > 0 {
            words.push(Word {
                text: std::mem::take(&mut current),
                start,
                len,
            });
            len = 0;
        }
    }

    if len > 0 {
        words.push(Word {
            text: current,
            start,
            len,
        });
    }

    words
}

/// The outcome of scoring one field against a query.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    /// Mean over matched tokens; `1.0` when no token matched.
    pub score: f64,
    pub ranges: Vec<MatchRange>,
    /// Per query token, whether it matched this field.
    pub matched: Vec<bool>,
}

impl FieldScore {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched.iter().any(|&m| m)
    }
}

/// Scores fields against query tokens.
pub struct Scorer {
    matcher: SkimMatcherV2,
    threshold: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Scorer {
    /// Tokens whose best word scores above `threshold` do not match.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
            threshold,
        }
    }

    /// Score a tokenized field. `tokens` must be lowercased.
    #[must_use]
    pub fn score_field(&self, tokens: &[String], words: &[Word]) -> FieldScore {
        let mut total = 0.0;
        let mut hits = 0_u32;
        let mut ranges = Vec::new();
        let mut matched = Vec::with_capacity(tokens.len());

        for token in tokens {
            let best = words
                .iter()
                .filter_map(|w| self.score_word(token, w))
                .fold(None, |best: Option<WordHit>, hit| match best {
                    Some(b) if b.score <= hit.score => Some(b),
                    _ => Some(hit),
                });

            match best {
                Some(hit) if hit.score <= self.threshold => {
                    total += hit.score;
                    hits += 1;
                    ranges.extend(hit.ranges);
                    matched.push(true);
                }
                _ => matched.push(false),
            }
        }

        ranges.sort_by_key(|r| (r.start, r.end));
        ranges.dedup();

        let score = if hits == 0 {
            NO_MATCH_SCORE
        } else {
            total / f64::from(hits)
        };
        FieldScore {
            score,
            ranges,
            matched,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn score_word(&self, token: &str, word: &Word) -> Option<WordHit> {
        let token_len = token.chars().count();
        if token_len == 0 {
            return None;
        }

        if word.text == token {
            return Some(WordHit::whole(0.0, word));
        }

        let mut best: Option<WordHit> = None;
        let mut offer = |hit: WordHit| {
            if best.as_ref().is_none_or(|b| hit.score < b.score) {
                best = Some(hit);
            }
        };

        if token_len >= 2 && word.text.starts_with(token) {
            offer(WordHit::span(PREFIX_SCORE, word, 0, token_len));
        } else if token_len >= 3
            && let Some(byte_pos) = word.text.find(token)
        {
            let offset = word.text[..byte_pos].chars().count();
            offer(WordHit::span(INFIX_SCORE, word, offset, token_len));
        }

        let max_edits = max_edits(token_len);
        if max_edits > 0
            && let Some(distance) = levenshtein_within(token, &word.text, max_edits)
        {
            let score = EDIT_BASE_SCORE + distance as f64 / token_len as f64;
            offer(WordHit::whole(score, word));
        }

        if token_len >= 3
            && let Some((_, indices)) = self.matcher.fuzzy_indices(&word.text, token)
        {
            let word_len = word.text.chars().count().max(token_len);
            let score = 1.0 - token_len as f64 / word_len as f64;
            offer(WordHit {
                score,
                ranges: collapse_indices(&indices, word),
            });
        }

        best
    }
}

#[derive(Debug, Clone)]
struct WordHit {
    score: f64,
    ranges: Vec<MatchRange>,
}

impl WordHit {
    fn whole(score: f64, word: &Word) -> Self {
        Self {
            score,
            ranges: vec![MatchRange {
                start: word.start,
                end: word.end(),
            }],
        }
    }

    fn span(score: f64, word: &Word, offset: usize, len: usize) -> Self {
        let start = (word.start + offset).min(word.end());
        let end = (start + len - 1).min(word.end());
        Self {
            score,
            ranges: vec![MatchRange { start, end }],
        }
    }
}

/// Turn matched char indices within a word into source-text ranges.
fn collapse_indices(indices: &[usize], word: &Word) -> Vec<MatchRange> {
    let mut ranges: Vec<MatchRange> = Vec::new();
    for &i in indices {
        let pos = (word.start + i).min(word.end());
        match ranges.last_mut() {
            Some(last) if last.end + 1 == pos => last.end = pos,
            Some(last) if last.end == pos => {}
            _ => ranges.push(MatchRange {
                start: pos,
                end: pos,
            }),
        }
    }
    ranges
}

/// Edits tolerated for a token of the given length.
fn max_edits(token_len: usize) -> usize {
    match token_len {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    }
}

/// Levenshtein distance if it is at most `max`.
///
/// Bails out early when the length difference alone exceeds `max`, or
/// when every cell of a DP row does.
fn levenshtein_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ac) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for (j, bc) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ac != bc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(prev + cost);
            prev = above;
            row_min = row_min.min(row[j + 1]);
        }

        if row_min > max {
            return None;
        }
    }

    let distance = row[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(q: &str) -> Vec<String> {
        tokenize(q).into_iter().map(|w| w.text).collect()
    }

    mod tokenizer {
        use super::*;

        #[test]
        fn splits_on_punctuation_and_tracks_char_positions() {
            let words = tokenize("A Rare, soul!");
            let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();

            assert_eq!(texts, vec!["a", "rare", "soul"]);
            assert_eq!(words[1].start, 2);
            assert_eq!(words[1].len, 4);
            assert_eq!(words[2].start, 8);
        }

        #[test]
        fn positions_count_chars_not_bytes() {
            let words = tokenize("café au lait");
            assert_eq!(words[1].start, 5);
        }

        #[test]
        fn empty_and_symbol_only() {
            assert!(tokenize("").is_empty());
            assert!(tokenize("  !!  ").is_empty());
        }
    }

    mod levenshtein {
        use super::*;

        #[test]
        fn within_bound() {
            assert_eq!(levenshtein_within("recipe", "recipe", 1), Some(0));
            assert_eq!(levenshtein_within("recipie", "recipe", 1), Some(1));
            assert_eq!(levenshtein_within("kitten", "sitting", 3), Some(3));
        }

        #[test]
        fn outside_bound() {
            assert_eq!(levenshtein_within("kitten", "sitting", 2), None);
            assert_eq!(levenshtein_within("a", "abcd", 2), None);
        }
    }

    mod scoring {
        use super::*;

        #[test]
        fn exact_match_scores_zero_with_word_range() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("soul"), &tokenize("A Rare Soul"));

            assert!(field.score.abs() < f64::EPSILON);
            assert_eq!(field.ranges, vec![MatchRange { start: 7, end: 10 }]);
        }

        #[test]
        fn prefix_covers_only_the_token() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("grat"), &tokenize("gratitude"));

            assert!((field.score - PREFIX_SCORE).abs() < 1e-9);
            assert_eq!(field.ranges, vec![MatchRange { start: 0, end: 3 }]);
        }

        #[test]
        fn infix_match() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("ship"), &tokenize("mentorship"));

            assert!(field.score <= INFIX_SCORE);
            assert!(field.ranges.contains(&MatchRange { start: 6, end: 9 }));
        }

        #[test]
        fn single_typo_is_tolerated() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("recipie"), &tokenize("his recipe"));

            assert!(field.score < 0.4, "score was {}", field.score);
            assert_eq!(field.ranges, vec![MatchRange { start: 4, end: 9 }]);
        }

        #[test]
        fn missing_token_is_reported_not_averaged() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("rare xylophone"), &tokenize("A Rare Soul"));

            assert!(field.score.abs() < f64::EPSILON);
            assert_eq!(field.matched, vec![true, false]);
            assert_eq!(field.ranges, vec![MatchRange { start: 2, end: 5 }]);
        }

        #[test]
        fn weak_token_is_not_highlighted() {
            let scorer = Scorer::new(0.0);
            let field = scorer.score_field(&tokens("soul kitchem"), &tokenize("soul kitchen"));

            assert_eq!(field.matched, vec![true, false]);
            assert_eq!(field.ranges, vec![MatchRange { start: 0, end: 3 }]);
        }

        #[test]
        fn unrelated_text_scores_one() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("xyzzy"), &tokenize("Sunday Kitchen"));

            assert!((field.score - NO_MATCH_SCORE).abs() < f64::EPSILON);
            assert!(field.ranges.is_empty());
            assert!(!field.is_match());
        }

        #[test]
        fn short_tokens_need_exact_or_prefix() {
            let scorer = Scorer::default();
            let field = scorer.score_field(&tokens("ou"), &tokenize("soul"));

            assert!((field.score - NO_MATCH_SCORE).abs() < f64::EPSILON);
        }
    }

    mod ranges {
        use super::*;

        #[test]
        fn consecutive_indices_collapse() {
            let word = Word {
                text: "gratitude".to_string(),
                start: 10,
                len: 9,
            };
            let ranges = collapse_indices(&[0, 1, 2, 5, 6], &word);

            assert_eq!(
                ranges,
                vec![
                    MatchRange { start: 10, end: 12 },
                    MatchRange { start: 15, end: 16 },
                ]
            );
        }
    }
}
