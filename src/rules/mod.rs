//! Scope rule compilation: definitions, inheritance resolution, token
//! classification, and matcher patterns

pub mod builder;
pub mod definition;
pub mod diagnostics;
pub mod pattern;

mod compiler;
mod resolver;

pub use builder::RuleBuilder;
pub use definition::{
    CloseTokens, FlattenedScopes, LanguageDefinition, LanguageId, ScopePair, ScopeToken,
    TokenKind, TokenTable,
};
pub use diagnostics::Diagnostic;
pub use pattern::{
    BracketPair, PatternOptions, bracket_pattern, build_pattern, compile_token_pattern,
    escape_token,
};
