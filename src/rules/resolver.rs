//! Inheritance resolution: extends-chain walking and scope flattening
//!
//! Walks a language's single-parent `extends` chain, collects scope pairs
//! from the language and every reachable ancestor, and merges them into one
//! mapping keyed by opening token with nearest-definition-wins precedence.
//! Already-flattened ancestors short-circuit the walk, bounding total work
//! to one full traversal per distinct chain instead of re-walking shared
//! base languages on every descendant's first resolution.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::definition::{FlattenedScopes, LanguageDefinition, LanguageId, ScopePair};
use super::diagnostics::Diagnostic;

/// Borrowed view over the raw and intermediate cache tiers for the duration
/// of one resolution. The visitation history is owned per call, so cycle
/// detection never leaks state across unrelated resolutions.
pub(crate) struct ScopeResolver<'a> {
    registrations: &'a HashMap<LanguageId, Arc<LanguageDefinition>>,
    flattened: &'a HashMap<LanguageId, Arc<FlattenedScopes>>,
}

impl<'a> ScopeResolver<'a> {
    pub(crate) fn new(
        registrations: &'a HashMap<LanguageId, Arc<LanguageDefinition>>,
        flattened: &'a HashMap<LanguageId, Arc<FlattenedScopes>>,
    ) -> Self {
        Self {
            registrations,
            flattened,
        }
    }

    /// Flatten `language` and every reachable ancestor into one mapping.
    ///
    /// The caller guarantees `language` is registered. Cycles and dangling
    /// `extends` references stop the ascent and are reported through
    /// `diagnostics`; whatever was collected up to that point still
    /// resolves.
    pub(crate) fn resolve(
        &self,
        language: &LanguageId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> FlattenedScopes {
        let collected = self.collect_scopes(language, diagnostics);

        // Apply ancestral levels first so nearer declarations overwrite by
        // opener.
        let mut scopes = BTreeMap::new();
        for level in collected.iter().rev() {
            for pair in level {
                let Some(open) = &pair.open else {
                    diagnostics.push(Diagnostic::MissingOpen {
                        language: language.clone(),
                    });
                    continue;
                };
                scopes.insert(open.clone(), pair.clone());
            }
        }

        FlattenedScopes {
            language: language.clone(),
            scopes,
        }
    }

    /// Walk the extends chain upward, collecting each node's own pair list,
    /// most specific first.
    fn collect_scopes(
        &self,
        language: &LanguageId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Vec<ScopePair>> {
        let mut collected = Vec::new();
        let mut history: Vec<LanguageId> = Vec::new();

        let Some(mut definition) = self.registrations.get(language) else {
            return collected;
        };

        loop {
            history.push(definition.language.clone());
            if let Some(scopes) = &definition.scopes {
                collected.push(scopes.clone());
            }

            let Some(parent) = &definition.extends else {
                break;
            };

            // An already-flattened parent subsumes its own ancestors.
            if let Some(flat) = self.flattened.get(parent) {
                collected.push(flat.scopes.values().cloned().collect());
                break;
            }

            if history.contains(parent) {
                let mut chain = history.clone();
                chain.push(parent.clone());
                diagnostics.push(Diagnostic::Cycle {
                    language: language.clone(),
                    chain,
                });
                break;
            }

            match self.registrations.get(parent) {
                Some(next) => definition = next,
                None => {
                    diagnostics.push(Diagnostic::UnknownParent {
                        language: definition.language.clone(),
                        parent: parent.clone(),
                    });
                    break;
                }
            }
        }

        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::definition::CloseTokens;

    fn pair(open: &str, close: &str) -> ScopePair {
        ScopePair {
            open: Some(open.to_string()),
            close: Some(CloseTokens::Single(close.to_string())),
        }
    }

    fn definition(
        language: &str,
        extends: Option<&str>,
        scopes: Vec<ScopePair>,
    ) -> (LanguageId, Arc<LanguageDefinition>) {
        let id = LanguageId::new(language);
        (
            id.clone(),
            Arc::new(LanguageDefinition {
                language: id,
                extends: extends.map(LanguageId::new),
                scopes: Some(scopes),
            }),
        )
    }

    #[test]
    fn child_redeclaration_wins_over_ancestors() {
        let registrations: HashMap<_, _> = [
            definition("base", None, vec![pair("{", "}"), pair("(", ")")]),
            definition("child", Some("base"), vec![pair("{", "END")]),
        ]
        .into_iter()
        .collect();
        let flattened = HashMap::new();
        let resolver = ScopeResolver::new(&registrations, &flattened);

        let mut diagnostics = Vec::new();
        let result = resolver.resolve(&LanguageId::new("child"), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(result.scopes.len(), 2);
        assert_eq!(
            result.scopes["{"].close.as_ref().unwrap().as_single(),
            Some("END")
        );
        assert_eq!(
            result.scopes["("].close.as_ref().unwrap().as_single(),
            Some(")")
        );
    }

    #[test]
    fn short_circuits_through_flattened_ancestor() {
        let registrations: HashMap<_, _> = [
            // The raw parent carries a stale edge upward; if the walk went
            // through it instead of its flattened form, "grandparent" would
            // be reported as unknown.
            definition("parent", Some("grandparent"), vec![pair("p", "q")]),
            definition("child", Some("parent"), vec![pair("a", "b")]),
        ]
        .into_iter()
        .collect();

        let parent_flat = FlattenedScopes {
            language: LanguageId::new("parent"),
            scopes: [("[".to_string(), pair("[", "]"))].into_iter().collect(),
        };
        let flattened: HashMap<_, _> = [(LanguageId::new("parent"), Arc::new(parent_flat))]
            .into_iter()
            .collect();
        let resolver = ScopeResolver::new(&registrations, &flattened);

        let mut diagnostics = Vec::new();
        let result = resolver.resolve(&LanguageId::new("child"), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(result.scopes.len(), 2);
        assert!(result.scopes.contains_key("a"));
        assert!(result.scopes.contains_key("["));
        assert!(!result.scopes.contains_key("p"));
    }

    #[test]
    fn cycle_stops_ascent_and_keeps_collected_pairs() {
        let registrations: HashMap<_, _> = [
            definition("a", Some("b"), vec![pair("{", "}")]),
            definition("b", Some("a"), vec![pair("(", ")")]),
        ]
        .into_iter()
        .collect();
        let flattened = HashMap::new();
        let resolver = ScopeResolver::new(&registrations, &flattened);

        let mut diagnostics = Vec::new();
        let result = resolver.resolve(&LanguageId::new("a"), &mut diagnostics);

        assert_eq!(result.scopes.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        match &diagnostics[0] {
            Diagnostic::Cycle { chain, .. } => {
                let chain: Vec<&str> = chain.iter().map(LanguageId::as_str).collect();
                assert_eq!(chain, ["a", "b", "a"]);
            }
            other => panic!("expected cycle diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn missing_open_is_dropped_from_the_mapping() {
        let registrations: HashMap<_, _> = [definition(
            "lang",
            None,
            vec![
                ScopePair {
                    open: None,
                    close: Some(CloseTokens::Single("}".to_string())),
                },
                pair("(", ")"),
            ],
        )]
        .into_iter()
        .collect();
        let flattened = HashMap::new();
        let resolver = ScopeResolver::new(&registrations, &flattened);

        let mut diagnostics = Vec::new();
        let result = resolver.resolve(&LanguageId::new("lang"), &mut diagnostics);

        assert_eq!(result.scopes.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::MissingOpen { .. }));
    }
}
