//! Bracket scope rule compilation for editor highlighting engines.
//!
//! Language definitions declare which token strings open and close nested
//! scopes (`{`/`}`, `begin`/`end`, ...) and may inherit from each other via
//! `extends`. This crate resolves that inheritance graph with
//! child-overrides-parent precedence, cycle safety, and tolerance for
//! malformed entries, then compiles each language into a flattened table of
//! classified tokens plus a matching regular expression. Compilation is
//! memoized so every language is compiled at most once.
//!
//! Loading definitions from configuration files and consuming the resulting
//! tables in a matching engine are the embedding application's concern.

pub mod error;
pub mod rules;

// Explicit exports for better API clarity
pub use error::{RuleError, RuleResult};
pub use rules::{
    CloseTokens, Diagnostic, FlattenedScopes, LanguageDefinition, LanguageId, RuleBuilder,
    ScopePair, ScopeToken, TokenKind, TokenTable,
};
