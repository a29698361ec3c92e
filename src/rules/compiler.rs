//! Token classification: flattened scope mappings into token tables
//!
//! Pure and deterministic given its input; no upward graph traversal
//! happens here. Each scope pair fans out into one Open token plus one
//! Close token per closing variant, or a single Ambiguous token when no
//! distinct closer exists.

use super::definition::{FlattenedScopes, LanguageId, ScopeToken, TokenKind, TokenTable};
use super::diagnostics::Diagnostic;
use crate::error::{RuleError, RuleResult};

/// Classify every pair of a flattened mapping into a token table.
///
/// A single-string `close` equal to its `open` is a fatal configuration
/// error for the whole language: once one pair's open/close disambiguation
/// is broken, no other pair in the language can be trusted.
pub(crate) fn compile_tokens(
    flattened: &FlattenedScopes,
    diagnostics: &mut Vec<Diagnostic>,
) -> RuleResult<TokenTable> {
    let mut table = TokenTable::default();

    for pair in flattened.scopes.values() {
        let Some(open) = &pair.open else {
            // Second guard; the resolver filters these before they reach a
            // flattened mapping it built itself.
            diagnostics.push(Diagnostic::MissingOpen {
                language: flattened.language.clone(),
            });
            continue;
        };

        match &pair.close {
            Some(close) => {
                if close.as_single() == Some(open.as_str()) {
                    return Err(RuleError::SelfReferentialPair {
                        language: flattened.language.clone(),
                        token: open.clone(),
                    });
                }

                record(
                    &mut table,
                    ScopeToken::new(open.clone(), TokenKind::Open, open.clone()),
                    &flattened.language,
                    diagnostics,
                );
                for variant in close.variants() {
                    record(
                        &mut table,
                        ScopeToken::new(variant.clone(), TokenKind::Close, open.clone()),
                        &flattened.language,
                        diagnostics,
                    );
                }
            }
            None => {
                record(
                    &mut table,
                    ScopeToken::new(open.clone(), TokenKind::Ambiguous, open.clone()),
                    &flattened.language,
                    diagnostics,
                );
            }
        }
    }

    Ok(table)
}

/// Insert one token, reporting when it shadows an entry of another owner.
fn record(
    table: &mut TokenTable,
    token: ScopeToken,
    language: &LanguageId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let name = token.name.clone();
    let owner = token.owner.clone();
    if let Some(previous) = table.insert(token) {
        if previous.owner != owner {
            diagnostics.push(Diagnostic::ShadowedToken {
                language: language.clone(),
                name,
                previous_owner: previous.owner,
                owner,
            });
        }
    }
}
