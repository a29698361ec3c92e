//! Error types for scope rule compilation
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::rules::LanguageId;
use thiserror::Error;

/// Fatal errors raised while compiling scope rules.
///
/// Recoverable conditions (cycles, dangling `extends` references, entries
/// missing their `open` token) are not errors; they degrade the result and
/// surface as [`crate::rules::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A pair declared the same literal as both its opener and its only
    /// closer. The whole language is rejected: once one pair's open/close
    /// disambiguation is broken, no other pair in the language can be
    /// trusted.
    #[error(
        "Open and close tokens are the same: '{token}' in language '{language}'\nSuggestion: Omit 'close' to declare the token as ambiguous (self-delimiting), like a quote character"
    )]
    SelfReferentialPair { language: LanguageId, token: String },

    /// A matcher pattern was requested over zero tokens.
    #[error(
        "Cannot build a matcher pattern from an empty token set\nSuggestion: Register at least one scope pair for the language before requesting its pattern"
    )]
    EmptyPattern,

    /// The generated alternation was rejected by the regex engine.
    #[error(
        "Generated pattern failed to compile: {0}\nSuggestion: Check declared tokens for unsupported constructs or excessive size"
    )]
    Pattern(#[from] regex::Error),
}

impl RuleError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::SelfReferentialPair { .. } => "SELF_REFERENTIAL_PAIR",
            Self::EmptyPattern => "EMPTY_PATTERN",
            Self::Pattern(_) => "PATTERN_COMPILE_FAILED",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::SelfReferentialPair { .. } => vec![
                "Remove the 'close' field to mark the token as ambiguous",
                "Use a distinct closing token if the scope has a real terminator",
            ],
            Self::EmptyPattern => vec![
                "Ensure the language resolved to at least one token",
                "Check earlier diagnostics for dropped scope pairs",
            ],
            Self::Pattern(_) => vec![
                "Inspect the declared tokens for pathological patterns",
                "Split very large token sets across several patterns",
            ],
        }
    }
}

/// Result type alias for rule compilation operations
pub type RuleResult<T> = Result<T, RuleError>;
