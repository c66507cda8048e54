//! Wildcard pattern matching for LIKE / NOT LIKE predicates.
//!
//! Provides the single implementation used by both index stores and direct
//! (per-object) predicate evaluation, so both evaluation modes agree.
//!
//! # Wildcards
//!
//! - `%` and `*` match zero or more characters
//! - `?` matches exactly one character
//!
//! Matching is **case-insensitive** and **accent-insensitive**: pattern and
//! candidate are both decomposed (NFD), stripped of combining marks and
//! lower-cased before comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyChar,
    Literal(char),
}

/// A compiled wildcard pattern.
///
/// ```
/// use cinder_core::pattern_match::WildcardPattern;
/// let pattern = WildcardPattern::new("J%");
/// assert!(pattern.matches("John"));
/// assert!(pattern.matches("josé"));
/// assert!(!pattern.matches("Mark"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardPattern {
    tokens: Vec<Token>,
}

impl WildcardPattern {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        for c in fold(pattern) {
            let token = match c {
                '%' | '*' => Token::AnyRun,
                '?' => Token::AnyChar,
                c => Token::Literal(c),
            };
            // Adjacent runs collapse into one.
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Self { tokens }
    }

    /// Tests a candidate string against the pattern.
    pub fn matches(&self, value: &str) -> bool {
        let v: Vec<char> = fold(value).collect();
        let p = &self.tokens;

        let (mut vi, mut pi) = (0usize, 0usize);
        // Position of the last `AnyRun` and the candidate index it resumes from.
        let mut backtrack: Option<(usize, usize)> = None;

        while vi < v.len() {
            match p.get(pi) {
                Some(Token::AnyRun) => {
                    backtrack = Some((pi, vi));
                    pi += 1;
                }
                Some(Token::AnyChar) => {
                    vi += 1;
                    pi += 1;
                }
                Some(Token::Literal(c)) if *c == v[vi] => {
                    vi += 1;
                    pi += 1;
                }
                _ => match backtrack {
                    Some((star_pi, star_vi)) => {
                        // Let the run swallow one more character.
                        backtrack = Some((star_pi, star_vi + 1));
                        pi = star_pi + 1;
                        vi = star_vi + 1;
                    }
                    None => return false,
                },
            }
        }

        p[pi..].iter().all(|t| *t == Token::AnyRun)
    }
}

/// Tests `value` against `pattern` without keeping the compiled form.
///
/// ```
/// use cinder_core::pattern_match::like;
/// assert!(like("hello", "h%o"));
/// assert!(like("hello", "?ello"));
/// assert!(like("HELLO", "h*"));
/// assert!(!like("hello", "world"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    WildcardPattern::new(pattern).matches(value)
}

/// Decomposes, strips combining marks and lower-cases.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
}
