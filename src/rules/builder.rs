//! Builder façade owning the three cache tiers
//!
//! One [`RuleBuilder`] instance holds raw registrations, per-language
//! flattened intermediates, and per-language finished token tables.
//! Resolution is lazy: a language is flattened and classified on its first
//! `get`, and every later `get` is a cache hit returning the same `Arc`.
//!
//! The tiers live behind `parking_lot` locks so an embedding system that
//! introduces concurrent callers cannot tear or duplicate population; the
//! design still assumes one logical owner issuing register/override/get
//! serially.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::compiler::compile_tokens;
use super::definition::{FlattenedScopes, LanguageDefinition, LanguageId, TokenTable};
use super::diagnostics::Diagnostic;
use super::resolver::ScopeResolver;
use crate::error::RuleResult;

/// Compiles registered language definitions into per-language token tables,
/// memoizing both the flattened inheritance result and the finished table.
pub struct RuleBuilder {
    /// Raw registrations, mutated by register/override, never
    /// auto-invalidated
    registrations: RwLock<HashMap<LanguageId, Arc<LanguageDefinition>>>,

    /// Flattened inheritance results; the memoization barrier that stops
    /// re-traversal of already-resolved ancestors
    flattened: RwLock<HashMap<LanguageId, Arc<FlattenedScopes>>>,

    /// Finished token tables, returned directly on every repeated `get`
    tables: RwLock<HashMap<LanguageId, Arc<TokenTable>>>,

    /// Conditions reported by resolutions, drained via `take_diagnostics`
    diagnostics: RwLock<Vec<Diagnostic>>,

    /// Full (non-memoized) resolutions performed, observable by tests
    resolutions: AtomicUsize,
}

impl RuleBuilder {
    pub fn new(definitions: impl IntoIterator<Item = LanguageDefinition>) -> Self {
        let builder = Self {
            registrations: RwLock::new(HashMap::new()),
            flattened: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashMap::new()),
            diagnostics: RwLock::new(Vec::new()),
            resolutions: AtomicUsize::new(0),
        };
        builder.register(definitions);
        builder
    }

    /// Insert or replace raw definitions, keyed by their `language` id.
    /// Last write wins.
    pub fn register(&self, definitions: impl IntoIterator<Item = LanguageDefinition>) {
        let mut registrations = self.registrations.write();
        for definition in definitions {
            registrations.insert(definition.language.clone(), Arc::new(definition));
        }
    }

    /// Re-register user customizations layered after defaults.
    ///
    /// Identical in effect to [`register`](Self::register); it exists as
    /// the semantically distinct entry point for overrides. Languages that
    /// already resolved keep serving their cached tables until
    /// [`invalidate_caches`](Self::invalidate_caches) is called; this
    /// staleness window is inherited behavior, kept deliberately.
    pub fn override_definitions(&self, definitions: impl IntoIterator<Item = LanguageDefinition>) {
        self.register(definitions);
    }

    /// Drop all flattened and compiled state, keeping raw registrations.
    /// The next `get` per language re-resolves against the current
    /// registrations.
    pub fn invalidate_caches(&self) {
        self.flattened.write().clear();
        self.tables.write().clear();
    }

    /// Number of full resolutions performed so far. Stable across cache
    /// hits, which is what makes memoization observable in tests.
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Drain the diagnostics reported by resolutions since the last call.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.write())
    }

    /// The token table for `language`, compiling it on first request.
    ///
    /// Returns `Ok(None)` for ids that were never registered. A fatal
    /// configuration error aborts the call and caches no table, so a later
    /// `get` re-attempts compilation instead of serving a partial result.
    pub fn get(&self, language: &str) -> RuleResult<Option<Arc<TokenTable>>> {
        let id = LanguageId::new(language);

        if let Some(table) = self.tables.read().get(&id) {
            return Ok(Some(Arc::clone(table)));
        }

        let mut diagnostics = Vec::new();
        let flat = {
            let registrations = self.registrations.read();
            if !registrations.contains_key(&id) {
                return Ok(None);
            }
            let flattened = self.flattened.read();
            ScopeResolver::new(&registrations, &flattened).resolve(&id, &mut diagnostics)
        };
        self.resolutions.fetch_add(1, Ordering::Relaxed);

        let flat = Arc::new(flat);
        self.flattened.write().insert(id.clone(), Arc::clone(&flat));

        let compiled = compile_tokens(&flat, &mut diagnostics);
        self.report(diagnostics);
        let table = Arc::new(compiled?);

        self.tables.write().insert(id.clone(), Arc::clone(&table));
        debug!(language = %id, tokens = table.len(), "compiled scope token table");
        Ok(Some(table))
    }

    fn report(&self, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        for diagnostic in &diagnostics {
            warn!("{diagnostic}");
        }
        self.diagnostics.write().extend(diagnostics);
    }
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::definition::{CloseTokens, ScopePair};

    fn definition(language: &str, extends: Option<&str>, pairs: &[(&str, &str)]) -> LanguageDefinition {
        LanguageDefinition {
            language: LanguageId::new(language),
            extends: extends.map(LanguageId::new),
            scopes: Some(
                pairs
                    .iter()
                    .map(|(open, close)| ScopePair {
                        open: Some(open.to_string()),
                        close: Some(CloseTokens::Single(close.to_string())),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn repeated_get_returns_the_same_table_without_resolving_again() {
        let builder = RuleBuilder::new([definition("lang", None, &[("{", "}")])]);

        let first = builder.get("lang").unwrap().unwrap();
        let second = builder.get("lang").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.resolution_count(), 1);
    }

    #[test]
    fn unknown_language_is_absent_not_an_error() {
        let builder = RuleBuilder::default();
        assert!(builder.get("nope").unwrap().is_none());
        assert_eq!(builder.resolution_count(), 0);
    }

    #[test]
    fn override_serves_stale_table_until_invalidated() {
        let builder = RuleBuilder::new([definition("lang", None, &[("{", "}")])]);
        let before = builder.get("lang").unwrap().unwrap();
        assert!(before.get("<").is_none());

        builder.override_definitions([definition("lang", None, &[("<", ">")])]);

        // Known staleness window: the cached table survives the override.
        let stale = builder.get("lang").unwrap().unwrap();
        assert!(Arc::ptr_eq(&before, &stale));

        builder.invalidate_caches();
        let fresh = builder.get("lang").unwrap().unwrap();
        assert!(fresh.get("<").is_some());
        assert!(fresh.get("{").is_none());
    }

    #[test]
    fn fatal_compile_error_caches_no_table() {
        let builder = RuleBuilder::new([definition("bad", None, &[("x", "x")])]);

        assert!(builder.get("bad").is_err());
        // No partial table was cached; the next call re-attempts and fails
        // the same way instead of serving anything.
        assert!(builder.get("bad").is_err());
        assert_eq!(builder.resolution_count(), 2);
    }

    #[test]
    fn ancestor_flattening_is_memoized_across_descendants() {
        let builder = RuleBuilder::new([
            definition("base", None, &[("{", "}")]),
            definition("a", Some("base"), &[("(", ")")]),
            definition("b", Some("base"), &[("[", "]")]),
        ]);

        builder.get("base").unwrap().unwrap();
        let a = builder.get("a").unwrap().unwrap();
        let b = builder.get("b").unwrap().unwrap();

        assert!(a.get("{").is_some());
        assert!(b.get("{").is_some());
        // One resolution each; the flattened base was reused, not re-walked.
        assert_eq!(builder.resolution_count(), 3);
    }
}
