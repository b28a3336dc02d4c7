//! Constraint tokenization: splitting input text into constrained and
//! unconstrained runs before handing it to the lattice.
//!
//! MeCab's boundary constraints are expressed per byte position of the
//! UTF-8 sentence, so the segmentation here must be byte-exact. The
//! functions in this module are pure; the runtime converts their output
//! into native boundary markers.

use regex::Regex;

use crate::constants::{MECAB_ANY_BOUNDARY, MECAB_INSIDE_TOKEN, MECAB_TOKEN_BOUNDARY};

/// Pattern used to mark constrained runs of the input text.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact substring match.
    Literal(String),
    /// Regular-expression match.
    Regex(Regex),
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::Literal(value.to_string())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::Literal(value)
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Pattern::Regex(value)
    }
}

impl Pattern {
    /// Returns the byte range of the leftmost match in `text`, if any.
    fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Pattern::Literal(literal) => {
                if literal.is_empty() {
                    return None;
                }
                text.find(literal.as_str())
                    .map(|start| (start, start + literal.len()))
            }
            // Zero-width matches are skipped, not treated as the end of
            // the scan; constraining an empty segment is meaningless.
            Pattern::Regex(regex) => regex
                .find_iter(text)
                .find(|found| !found.as_str().is_empty())
                .map(|found| (found.start(), found.end())),
        }
    }
}

/// One segment of constraint-tokenized text.
///
/// `constrained` is true when the segment matched the caller's pattern and
/// must be kept as a single token by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedToken {
    /// Segment text, trimmed of the surrounding whitespace MeCab discards.
    pub text: String,
    /// Whether this segment is a forced single token.
    pub constrained: bool,
}

impl SegmentedToken {
    fn new(text: &str, constrained: bool) -> Option<Self> {
        // MeCab eats leading and trailing whitespace around each chunk.
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            constrained,
        })
    }
}

/// Splits `text` into ordered `(segment, constrained)` runs by repeated
/// leftmost matching of `pattern`.
///
/// Unmatched prefixes and the trailing suffix come out unconstrained;
/// matches come out constrained. Empty segments are never emitted, so a
/// text with zero matches yields a single unconstrained token and
/// adjacent matches produce no empty gap between them.
pub fn tokenize_by_pattern(text: &str, pattern: &Pattern) -> Vec<SegmentedToken> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some((start, end)) = pattern.find(rest) {
        tokens.extend(SegmentedToken::new(&rest[..start], false));
        tokens.extend(SegmentedToken::new(&rest[start..end], true));
        rest = &rest[end..];
    }
    tokens.extend(SegmentedToken::new(rest, false));

    tokens
}

/// Applies [`tokenize_by_pattern`] once per feature key, each key treated
/// as a literal, refining only the segments still unconstrained after the
/// previous pass. Earlier keys take priority: their matches are locked in
/// before later keys are attempted on the remainder.
pub fn tokenize_by_features(text: &str, keys: &[&str]) -> Vec<SegmentedToken> {
    let mut tokens: Vec<SegmentedToken> = SegmentedToken::new(text, false).into_iter().collect();

    for key in keys {
        let pattern = Pattern::Literal((*key).to_string());
        let mut refined = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.constrained {
                refined.push(token);
            } else {
                refined.extend(tokenize_by_pattern(&token.text, &pattern));
            }
        }
        tokens = refined;
    }

    tokens
}

/// Expands segmented tokens into MeCab's per-byte boundary marker stream.
///
/// Each token contributes a [`MECAB_TOKEN_BOUNDARY`] mark at its first
/// byte, then one mark per remaining byte: [`MECAB_INSIDE_TOKEN`] for
/// constrained segments, [`MECAB_ANY_BOUNDARY`] for gaps. The native
/// library indexes these marks by raw byte offset into the UTF-8
/// sentence, so the stream length equals the concatenated byte length.
pub(crate) fn boundary_marks(tokens: &[SegmentedToken]) -> Vec<i32> {
    let total: usize = tokens.iter().map(|token| token.text.len()).sum();
    let mut marks = Vec::with_capacity(total);
    for token in tokens {
        let fill = if token.constrained {
            MECAB_INSIDE_TOKEN
        } else {
            MECAB_ANY_BOUNDARY
        };
        marks.push(MECAB_TOKEN_BOUNDARY);
        for _ in 1..token.text.len() {
            marks.push(fill);
        }
    }
    marks
}

#[cfg(test)]
mod segment_tests {
    use super::{
        boundary_marks, tokenize_by_features, tokenize_by_pattern, Pattern, SegmentedToken,
    };
    use crate::constants::{MECAB_ANY_BOUNDARY, MECAB_INSIDE_TOKEN, MECAB_TOKEN_BOUNDARY};
    use regex::Regex;

    fn token(text: &str, constrained: bool) -> SegmentedToken {
        SegmentedToken {
            text: text.to_string(),
            constrained,
        }
    }

    #[test]
    fn no_match_yields_single_unconstrained_token() {
        let tokens = tokenize_by_pattern("すもももももも", &Pattern::from("李"));
        assert_eq!(tokens, vec![token("すもももももも", false)]);
    }

    #[test]
    fn full_match_yields_single_constrained_token() {
        let text = "見えねえ風景";
        let tokens = tokenize_by_pattern(text, &Pattern::from(text));
        assert_eq!(tokens, vec![token(text, true)]);
    }

    #[test]
    fn literal_match_splits_prefix_match_suffix() {
        let text = "凡人にしか見えねえ風景ってのがあるんだよ。";
        let tokens = tokenize_by_pattern(text, &Pattern::from("見えねえ風景"));
        assert_eq!(
            tokens,
            vec![
                token("凡人にしか", false),
                token("見えねえ風景", true),
                token("ってのがあるんだよ。", false),
            ]
        );
    }

    #[test]
    fn adjacent_matches_emit_no_empty_gap_tokens() {
        let tokens = tokenize_by_pattern("abab", &Pattern::from("ab"));
        assert_eq!(tokens, vec![token("ab", true), token("ab", true)]);
    }

    #[test]
    fn regex_pattern_matches_repeatedly() {
        let regex = Regex::new(r"\d+").unwrap();
        let tokens = tokenize_by_pattern("第1章と第22章", &Pattern::from(regex));
        assert_eq!(
            tokens,
            vec![
                token("第", false),
                token("1", true),
                token("章と第", false),
                token("22", true),
                token("章", false),
            ]
        );
    }

    #[test]
    fn segments_reconcatenate_to_input_modulo_trims() {
        let text = "凡人にしか 見えねえ風景 ってのがあるんだよ。";
        let tokens = tokenize_by_pattern(text, &Pattern::from("見えねえ風景"));
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, text.split_whitespace().collect::<String>());
        assert!(tokens.iter().all(|t| !t.text.is_empty()));
    }

    #[test]
    fn empty_literal_never_loops() {
        let tokens = tokenize_by_pattern("abc", &Pattern::from(""));
        assert_eq!(tokens, vec![token("abc", false)]);
    }

    #[test]
    fn zero_width_regex_match_is_skipped() {
        let regex = Regex::new(r"x*").unwrap();
        let tokens = tokenize_by_pattern("abc", &Pattern::from(regex));
        assert_eq!(tokens, vec![token("abc", false)]);
    }

    #[test]
    fn zero_width_prefix_match_does_not_hide_later_matches() {
        // "x*" matches empty at offset 0; the non-empty "xx" further in
        // must still be found.
        let regex = Regex::new(r"x*").unwrap();
        let tokens = tokenize_by_pattern("axxb", &Pattern::from(regex));
        assert_eq!(
            tokens,
            vec![token("a", false), token("xx", true), token("b", false)]
        );
    }

    #[test]
    fn feature_keys_refine_only_unconstrained_segments() {
        let tokens = tokenize_by_features("焼きカレーパンとカレー", &["カレーパン", "カレー"]);
        assert_eq!(
            tokens,
            vec![
                token("焼き", false),
                token("カレーパン", true),
                token("と", false),
                token("カレー", true),
            ]
        );
    }

    #[test]
    fn earlier_feature_keys_take_priority() {
        // "カレー" alone would split "カレーパン"; the longer key runs first
        // and locks its match in.
        let longest_first = tokenize_by_features("カレーパン", &["カレーパン", "カレー"]);
        assert_eq!(longest_first, vec![token("カレーパン", true)]);

        let shortest_first = tokenize_by_features("カレーパン", &["カレー", "カレーパン"]);
        assert_eq!(
            shortest_first,
            vec![token("カレー", true), token("パン", false)]
        );
    }

    #[test]
    fn boundary_marks_cover_every_byte_once() {
        let tokens = vec![token("凡人にしか", false), token("見えねえ風景", true)];
        let marks = boundary_marks(&tokens);
        assert_eq!(marks.len(), "凡人にしか".len() + "見えねえ風景".len());

        // First byte of each segment forces a token boundary.
        assert_eq!(marks[0], MECAB_TOKEN_BOUNDARY);
        assert_eq!(marks["凡人にしか".len()], MECAB_TOKEN_BOUNDARY);

        // Gap bytes permit any boundary; constrained bytes stay inside.
        assert!(marks[1.."凡人にしか".len()]
            .iter()
            .all(|&mark| mark == MECAB_ANY_BOUNDARY));
        assert!(marks["凡人にしか".len() + 1..]
            .iter()
            .all(|&mark| mark == MECAB_INSIDE_TOKEN));
    }

    #[test]
    fn boundary_marks_for_single_byte_tokens() {
        let tokens = vec![token("a", true), token("b", false)];
        assert_eq!(
            boundary_marks(&tokens),
            vec![MECAB_TOKEN_BOUNDARY, MECAB_TOKEN_BOUNDARY]
        );
    }
}
