//! Type matchers: exact structural matching and the anywhere fallback.
//!
//! A [`TypeMatcher`] is built from one skip-type pattern and answers whether a
//! candidate type matches it. The engine only ever talks to matchers through
//! this trait, so hosts can plug in their own matching rules. The bundled
//! [`ExactMatcher`] implements structural matching with a wildcard leaf and
//! prefix semantics for composites.
//!
//! [`matches_anywhere`] layers a coarse fallback on top of any matcher: a
//! pattern matches either the whole candidate, or any leaf nested inside it.
//! With the pattern `float64` all of these match:
//!
//! ```text
//! float64
//! ((vector, float64, const), &)
//! (set, float64)
//! ```

use serde::Serialize;

use crate::types::TypeExpr;

/// Pattern leaf that matches any candidate sub-expression.
pub const MATCH_ANY: &str = "?";

// ============================================================================
// Match Outcome
// ============================================================================

/// Result of testing a candidate against a matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The candidate matches the pattern.
    Match,
    /// The candidate does not match the pattern.
    NoMatch,
    /// The candidate has a shape the matcher cannot evaluate.
    Incompatible,
}

impl MatchOutcome {
    /// Returns true only for [`MatchOutcome::Match`].
    pub fn is_match(self) -> bool {
        self == MatchOutcome::Match
    }
}

// ============================================================================
// Matcher Capability
// ============================================================================

/// A predicate compiled from a single pattern.
pub trait TypeMatcher {
    /// The pattern this matcher was built from.
    fn pattern(&self) -> &TypeExpr;

    /// Test a candidate against the pattern.
    fn matches(&self, candidate: &TypeExpr) -> MatchOutcome;
}

impl<M: TypeMatcher + ?Sized> TypeMatcher for Box<M> {
    fn pattern(&self) -> &TypeExpr {
        (**self).pattern()
    }

    fn matches(&self, candidate: &TypeExpr) -> MatchOutcome {
        (**self).matches(candidate)
    }
}

impl<M: TypeMatcher + ?Sized> TypeMatcher for &M {
    fn pattern(&self) -> &TypeExpr {
        (**self).pattern()
    }

    fn matches(&self, candidate: &TypeExpr) -> MatchOutcome {
        (**self).matches(candidate)
    }
}

/// Structural matcher with wildcard and prefix semantics.
///
/// - A `?` leaf in the pattern matches anything in that position.
/// - A leaf pattern only matches an equal candidate.
/// - A composite pattern matches a composite candidate at least as long,
///   element by element; extra trailing candidate elements are ignored, so
///   `(vector, float64)` matches `(vector, float64, 0)`.
/// - A composite pattern against an opaque atom is [`MatchOutcome::Incompatible`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatcher {
    pattern: TypeExpr,
}

impl ExactMatcher {
    /// Compile a pattern.
    pub fn new(pattern: TypeExpr) -> Self {
        ExactMatcher { pattern }
    }
}

impl TypeMatcher for ExactMatcher {
    fn pattern(&self) -> &TypeExpr {
        &self.pattern
    }

    fn matches(&self, candidate: &TypeExpr) -> MatchOutcome {
        match_structure(&self.pattern, candidate)
    }
}

fn match_structure(pattern: &TypeExpr, candidate: &TypeExpr) -> MatchOutcome {
    if pattern.as_leaf() == Some(MATCH_ANY) || pattern == candidate {
        return MatchOutcome::Match;
    }

    match (pattern, candidate) {
        (TypeExpr::Leaf(_) | TypeExpr::Opaque(_), _) => MatchOutcome::NoMatch,
        (TypeExpr::Composite(_), TypeExpr::Leaf(_)) => MatchOutcome::NoMatch,
        (TypeExpr::Composite(_), TypeExpr::Opaque(_)) => MatchOutcome::Incompatible,
        (TypeExpr::Composite(parts), TypeExpr::Composite(items)) => {
            if items.len() < parts.len() {
                return MatchOutcome::NoMatch;
            }
            let mut incompatible = false;
            for (part, item) in parts.iter().zip(items) {
                match match_structure(part, item) {
                    MatchOutcome::Match => {}
                    MatchOutcome::NoMatch => return MatchOutcome::NoMatch,
                    MatchOutcome::Incompatible => incompatible = true,
                }
            }
            if incompatible {
                MatchOutcome::Incompatible
            } else {
                MatchOutcome::Match
            }
        }
    }
}

// ============================================================================
// Flattening and Anywhere Matching
// ============================================================================

/// Collect every leaf-like node (leaf or opaque atom) of an expression.
///
/// Traversal is depth-first through every composite slot. The result is
/// never empty: an expression without any leaves flattens to itself.
pub fn flatten(expr: &TypeExpr) -> Vec<&TypeExpr> {
    let mut leaves = Vec::new();
    collect_leaves(expr, &mut leaves);
    if leaves.is_empty() {
        leaves.push(expr);
    }
    leaves
}

fn collect_leaves<'a>(expr: &'a TypeExpr, out: &mut Vec<&'a TypeExpr>) {
    match expr {
        TypeExpr::Leaf(_) | TypeExpr::Opaque(_) => out.push(expr),
        TypeExpr::Composite(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
    }
}

/// Returns true if the matcher accepts the whole candidate or any of its leaves.
///
/// Incompatible outcomes are treated as non-matches and never abort the check.
pub fn matches_anywhere<M: TypeMatcher + ?Sized>(matcher: &M, candidate: &TypeExpr) -> bool {
    match matcher.matches(candidate) {
        MatchOutcome::Match => return true,
        MatchOutcome::NoMatch => {}
        MatchOutcome::Incompatible => {
            tracing::trace!(
                "pattern {} cannot be evaluated against {}, treating as no match",
                matcher.pattern(),
                candidate
            );
        }
    }

    match candidate {
        TypeExpr::Leaf(_) => matcher.matches(candidate).is_match(),
        TypeExpr::Composite(_) => flatten(candidate)
            .into_iter()
            .any(|leaf| matcher.matches(leaf).is_match()),
        TypeExpr::Opaque(_) => false,
    }
}
