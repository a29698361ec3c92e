//! Structured reporting for recoverable resolution conditions
//!
//! Malformed entries, inheritance cycles, and dangling `extends` references
//! degrade the resolved result instead of failing it. Each occurrence is
//! recorded as a [`Diagnostic`] so callers and tests can assert on what was
//! reported, rather than scraping log output.

use std::fmt;

use super::definition::LanguageId;

/// A recoverable condition encountered while resolving or compiling a
/// language's scope rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A scope pair without an `open` token was dropped.
    MissingOpen { language: LanguageId },

    /// The `extends` chain looped back on itself; ascent stopped and the
    /// result was built from what had been collected up to that point.
    Cycle {
        language: LanguageId,
        /// Visitation order, ending with the node that closed the loop
        chain: Vec<LanguageId>,
    },

    /// `extends` names a language that was never registered.
    UnknownParent {
        language: LanguageId,
        parent: LanguageId,
    },

    /// A token displaced an earlier table entry belonging to a different
    /// owner; the later declaration won.
    ShadowedToken {
        language: LanguageId,
        name: String,
        previous_owner: String,
        owner: String,
    },
}

impl Diagnostic {
    /// The language whose resolution reported this condition.
    pub fn language(&self) -> &LanguageId {
        match self {
            Self::MissingOpen { language }
            | Self::Cycle { language, .. }
            | Self::UnknownParent { language, .. }
            | Self::ShadowedToken { language, .. } => language,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOpen { language } => {
                write!(f, "Missing 'open' property in a scope of '{language}'")
            }
            Self::Cycle { language, chain } => {
                let chain: Vec<&str> = chain.iter().map(LanguageId::as_str).collect();
                write!(
                    f,
                    "Cycle detected while resolving '{language}': {}",
                    chain.join(" => ")
                )
            }
            Self::UnknownParent { language, parent } => {
                write!(
                    f,
                    "Could not find language '{parent}' extended by '{language}'"
                )
            }
            Self::ShadowedToken {
                language,
                name,
                previous_owner,
                owner,
            } => {
                write!(
                    f,
                    "Token '{name}' of '{owner}' shadows the one owned by '{previous_owner}' in '{language}'"
                )
            }
        }
    }
}
