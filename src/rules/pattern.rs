//! Alternation pattern construction for token scanning
//!
//! Combines a set of literal bracket/token strings into one regular
//! expression the matching engine can scan documents with. Keyword-style
//! tokens (`begin`, `end`) are wrapped in word boundaries so they never
//! match inside longer identifiers; punctuation tokens match anywhere.

use regex::{Regex, RegexBuilder};

use crate::error::{RuleError, RuleResult};

/// Flags for pattern construction.
///
/// Patterns are case-insensitive unless `match_case` is set. The scanning
/// itself is always global: `Regex::find_iter` visits every match.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOptions {
    pub match_case: bool,
    pub whole_word: bool,
    pub multiline: bool,
}

/// Characters with meaning inside a pattern, escaped in literal tokens.
const ESCAPED: &[char] = &[
    '-', '\\', '{', '}', '*', '+', '?', '|', '^', '$', '.', '[', ']', '(', ')', '#',
];

/// Escape a literal token for embedding in a pattern.
pub fn escape_token(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if ESCAPED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Escape one token, wrapping keyword-style tokens in word boundaries.
fn prepare_token(token: &str) -> String {
    let keyword = !token.is_empty() && token.chars().all(is_word_char);
    let escaped = escape_token(token);
    if keyword {
        format!("\\b{escaped}\\b")
    } else {
        escaped
    }
}

/// One alternation over `tokens`, each literal in its own capture group so
/// the matching engine can recover which literal matched by group index.
/// Case-insensitive by default; errs on an empty token set.
pub fn compile_token_pattern<S: AsRef<str>>(tokens: &[S]) -> RuleResult<Regex> {
    if tokens.is_empty() {
        return Err(RuleError::EmptyPattern);
    }
    let body = tokens
        .iter()
        .map(|token| prepare_token(token.as_ref()))
        .collect::<Vec<_>>()
        .join(")|(");
    build_pattern(&format!("({body})"), true, PatternOptions::default())
}

/// A simple open/close literal pair, for building a matcher over a bracket
/// set without going through a full language definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPair {
    pub open: String,
    pub close: String,
}

/// Alternation over every opener and closer of `brackets`, in declaration
/// order.
pub fn bracket_pattern(brackets: &[BracketPair]) -> RuleResult<Regex> {
    let mut pieces = Vec::with_capacity(brackets.len() * 2);
    for bracket in brackets {
        pieces.push(bracket.open.as_str());
        pieces.push(bracket.close.as_str());
    }
    compile_token_pattern(&pieces)
}

/// General pattern entry point.
///
/// `search` is escaped first unless it already is a regular expression.
/// `whole_word` adds boundary assertions at word-character pattern edges.
/// Empty input is refused: a matcher cannot be built from zero tokens.
pub fn build_pattern(search: &str, is_regex: bool, options: PatternOptions) -> RuleResult<Regex> {
    if search.is_empty() {
        return Err(RuleError::EmptyPattern);
    }

    let mut pattern = if is_regex {
        search.to_string()
    } else {
        escape_token(search)
    };

    if options.whole_word {
        if pattern.chars().next().is_some_and(is_word_char) {
            pattern.insert_str(0, "\\b");
        }
        if pattern.chars().last().is_some_and(is_word_char) {
            pattern.push_str("\\b");
        }
    }

    RegexBuilder::new(&pattern)
        .case_insensitive(!options.match_case)
        .multi_line(options.multiline)
        .build()
        .map_err(RuleError::from)
}
