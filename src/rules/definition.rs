//! Scope model: the passive data entities of rule compilation
//!
//! Raw language definitions arrive from an external configuration loader,
//! flow through inheritance resolution into a flattened per-language scope
//! mapping, and end up as tables of classified tokens consumed by a
//! bracket-matching engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RuleResult;
use crate::rules::pattern::compile_token_pattern;

/// Identifier for a user-registered language.
///
/// Ids are user-supplied strings that act as the graph-node key for the
/// `extends` inheritance edges. Backed by a shared string so clones are
/// cheap during graph traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageId(Arc<str>);

impl LanguageId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Get the string identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LanguageId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl Serialize for LanguageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// Raw, user-registered language definition.
///
/// Immutable once registered; re-registering the same `language` id
/// replaces the whole object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    /// Unique identifier, the graph-node key
    pub language: LanguageId,

    /// Single-parent inheritance edge to another definition's id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<LanguageId>,

    /// Scope pairs declared directly on this language, in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<ScopePair>>,
}

/// One open/close (or ambiguous) scope declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopePair {
    /// The literal token that begins a scope. Required in well-formed
    /// input; entries without it are reported and dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,

    /// The closing token(s). Absent means the pair is ambiguous: the same
    /// literal opens and closes the scope (e.g. a quote character).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<CloseTokens>,
}

/// A single closing token or an ordered set of alternatives that all
/// terminate the same scope (`begin` closed by `end` or `endcase`).
///
/// Untagged so definitions deserialize from the natural wire shape: a bare
/// string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CloseTokens {
    Single(String),
    Variants(Vec<String>),
}

impl CloseTokens {
    /// All closing variants as a uniform slice, a lone string being a
    /// one-element set.
    pub fn variants(&self) -> &[String] {
        match self {
            Self::Single(close) => std::slice::from_ref(close),
            Self::Variants(variants) => variants,
        }
    }

    /// The closing token if this is the single-string form.
    ///
    /// Only this form participates in the fatal open == close check; a
    /// variant list containing the opener is legal and resolves by
    /// last-write-wins in the token table.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(close) => Some(close),
            Self::Variants(_) => None,
        }
    }
}

/// A language's scope pairs after inheritance flattening, keyed by opener.
///
/// This is the point at which override precedence is resolved into one
/// deterministic mapping: nearest definition wins per `open` token. Ordered
/// by key so downstream token classification never depends on hash order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedScopes {
    pub language: LanguageId,
    pub scopes: BTreeMap<String, ScopePair>,
}

/// Classification of a token in the final table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Open,
    Close,
    Ambiguous,
}

/// One classified token, the unit the matching engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeToken {
    /// The literal token text
    pub name: String,
    pub kind: TokenKind,
    /// The `open` token of the pair this token belongs to. Equals `name`
    /// for Open and Ambiguous tokens; links a Close token back to its
    /// opener.
    pub owner: String,
}

impl ScopeToken {
    pub fn new(name: impl Into<String>, kind: TokenKind, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: owner.into(),
        }
    }
}

/// Per-language table of classified tokens, keyed by token text.
///
/// Multiple Close tokens may share one owner (multi-variant closers).
/// Collisions across owners resolve last-write-wins and are reported as
/// [`crate::rules::Diagnostic::ShadowedToken`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenTable {
    tokens: BTreeMap<String, ScopeToken>,
}

impl TokenTable {
    /// Insert a token, returning any entry it displaced.
    pub(crate) fn insert(&mut self, token: ScopeToken) -> Option<ScopeToken> {
        self.tokens.insert(token.name.clone(), token)
    }

    /// Look up the classification of a literal token.
    pub fn get(&self, name: &str) -> Option<&ScopeToken> {
        self.tokens.get(name)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in deterministic (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = &ScopeToken> {
        self.tokens.values()
    }

    /// Token texts in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    /// One alternation pattern over every token in the table, each literal
    /// in its own capture group. Errs on an empty table.
    pub fn pattern(&self) -> RuleResult<Regex> {
        let names: Vec<&str> = self.names().collect();
        compile_token_pattern(&names)
    }
}
