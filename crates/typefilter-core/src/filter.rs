//! The filter engine: removes members whose types match a skip type.
//!
//! Filtering runs in two phases. Setup ([`TypeFilter::new`] or
//! [`TypeFilter::with_matcher`]) compiles every configured pattern into a
//! matcher once. Execution ([`TypeFilter::apply`]) walks every class of an
//! [`Environment`] and removes, in place:
//!
//! - attributes whose type matches any pattern, and
//! - methods whose return type or any parameter type matches any pattern.
//!
//! Matching uses [`matches_anywhere`], so a leaf pattern such as `float64`
//! catches the type wherever it is nested, while a composite pattern such as
//! `((int32, const), &)` only catches that exact type. Class descriptors
//! themselves are never removed.
//!
//! ## Usage
//!
//! ```
//! use typefilter_core::{filter, ClassDesc, Environment, SkipTypes, TypeExpr};
//! use std::collections::BTreeMap;
//!
//! let mut env = Environment::new();
//! env.insert_class("m", ClassDesc::new("Blah").with_attr("x", "float64"));
//!
//! let skips = SkipTypes::PerClass(BTreeMap::from([(
//!     "Blah".to_string(),
//!     vec![TypeExpr::leaf("float64")],
//! )]));
//! let report = filter(&mut env, &skips);
//!
//! assert_eq!(report.len(), 1);
//! assert!(env.class("m", "Blah").unwrap().attrs.is_empty());
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::matcher::{matches_anywhere, ExactMatcher, TypeMatcher};
use crate::model::{ClassDesc, Environment};
use crate::skiptypes::SkipTypes;
use crate::types::TypeExpr;

// ============================================================================
// Report
// ============================================================================

/// Where in a member the matching type was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSite {
    /// The attribute's type.
    Attribute,
    /// The method's return type.
    Return,
    /// A method parameter's type.
    Param { index: usize, name: String },
}

/// Which member was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovedMember {
    /// An attribute, by name.
    Attribute { name: String },
    /// A method, by rendered signature.
    Method { signature: String },
}

/// A single removal performed by a filter pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    /// Module containing the class.
    pub module: String,
    /// Class name.
    pub class: String,
    /// The removed member.
    pub member: RemovedMember,
    /// Where the match was found.
    pub site: MatchSite,
    /// The pattern that matched.
    pub pattern: TypeExpr,
    /// The type the pattern matched against.
    pub matched: TypeExpr,
}

/// Everything a filter pass removed, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    /// Number of class descriptors visited with an applicable pattern list.
    pub classes_visited: usize,
    /// Removals in traversal order.
    pub removals: Vec<Removal>,
}

impl FilterReport {
    /// Total number of removed members.
    pub fn len(&self) -> usize {
        self.removals.len()
    }

    /// Returns true if nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Number of removed attributes.
    pub fn attributes_removed(&self) -> usize {
        self.removals
            .iter()
            .filter(|r| matches!(r.member, RemovedMember::Attribute { .. }))
            .count()
    }

    /// Number of removed methods.
    pub fn methods_removed(&self) -> usize {
        self.removals
            .iter()
            .filter(|r| matches!(r.member, RemovedMember::Method { .. }))
            .count()
    }
}

// ============================================================================
// Filter Engine
// ============================================================================

/// Compiled skip types.
#[derive(Debug, Clone)]
enum Rules<M> {
    Global(Vec<M>),
    PerClass(BTreeMap<String, Vec<M>>),
}

/// A compiled type filter, reusable across environments.
#[derive(Debug, Clone)]
pub struct TypeFilter<M = ExactMatcher> {
    rules: Option<Rules<M>>,
}

impl TypeFilter<ExactMatcher> {
    /// Compile skip types with the structural [`ExactMatcher`].
    pub fn new(skips: &SkipTypes) -> Self {
        TypeFilter::with_matcher(skips, |pattern| ExactMatcher::new(pattern.clone()))
    }
}

impl<M: TypeMatcher> TypeFilter<M> {
    /// Compile skip types with a custom matcher factory.
    pub fn with_matcher<F>(skips: &SkipTypes, mut build: F) -> Self
    where
        F: FnMut(&TypeExpr) -> M,
    {
        let rules = match skips {
            SkipTypes::Unset => None,
            SkipTypes::Global(patterns) => {
                Some(Rules::Global(patterns.iter().map(&mut build).collect()))
            }
            SkipTypes::PerClass(map) => Some(Rules::PerClass(
                map.iter()
                    .map(|(class, patterns)| {
                        (class.clone(), patterns.iter().map(&mut build).collect::<Vec<M>>())
                    })
                    .collect(),
            )),
        };
        TypeFilter { rules }
    }

    /// Returns true if applying this filter can never change a model.
    pub fn is_noop(&self) -> bool {
        self.rules.is_none()
    }

    /// Remove every matching attribute and method from the environment.
    pub fn apply(&self, env: &mut Environment) -> FilterReport {
        let mut report = FilterReport::default();
        let Some(rules) = &self.rules else {
            tracing::debug!("typefilter: no skip types configured, leaving model untouched");
            return report;
        };

        tracing::debug!("typefilter: removing unwanted types from description model");

        if let Rules::PerClass(map) = rules {
            for class in map.keys() {
                if !env.classes().any(|(_, desc)| &desc.name == class) {
                    tracing::debug!("skip types given for unknown class '{}', ignoring", class);
                }
            }
        }

        for (module, class) in env.classes_mut() {
            let skips = match rules {
                Rules::Global(skips) => skips.as_slice(),
                Rules::PerClass(map) => match map.get(&class.name) {
                    Some(skips) => skips.as_slice(),
                    None => continue,
                },
            };
            report.classes_visited += 1;
            filter_class(module, class, skips, &mut report);
        }

        tracing::info!(
            "typefilter: removed {} attribute(s) and {} method(s) across {} class(es)",
            report.attributes_removed(),
            report.methods_removed(),
            report.classes_visited
        );
        report
    }
}

/// Remove members of one class that match any of `skips`.
fn filter_class<M: TypeMatcher>(
    module: &str,
    class: &mut ClassDesc,
    skips: &[M],
    report: &mut FilterReport,
) {
    let class_name = class.name.clone();
    let mut removed = Vec::new();

    class.attrs.retain(|name, ty| match first_match(skips, ty) {
        Some(matcher) => {
            removed.push((
                RemovedMember::Attribute { name: name.clone() },
                MatchSite::Attribute,
                matcher.pattern().clone(),
                ty.clone(),
            ));
            false
        }
        None => true,
    });

    class.methods.retain(|key, returns| {
        if let Some(ret) = returns {
            if let Some(matcher) = first_match(skips, ret) {
                removed.push((
                    RemovedMember::Method {
                        signature: key.to_string(),
                    },
                    MatchSite::Return,
                    matcher.pattern().clone(),
                    ret.clone(),
                ));
                return false;
            }
        }

        for (index, param) in key.params.iter().enumerate() {
            if let Some(matcher) = first_match(skips, &param.ty) {
                removed.push((
                    RemovedMember::Method {
                        signature: key.to_string(),
                    },
                    MatchSite::Param {
                        index,
                        name: param.name.clone(),
                    },
                    matcher.pattern().clone(),
                    param.ty.clone(),
                ));
                return false;
            }
        }
        true
    });

    for (member, site, pattern, matched) in removed {
        tracing::debug!(
            "typefilter: removing {:?} from {}.{} (pattern {} matched {})",
            member,
            module,
            class_name,
            pattern,
            matched
        );
        report.removals.push(Removal {
            module: module.to_string(),
            class: class_name.clone(),
            member,
            site,
            pattern,
            matched,
        });
    }
}

/// The first matcher that matches `ty` anywhere, in configuration order.
fn first_match<'a, M: TypeMatcher>(skips: &'a [M], ty: &TypeExpr) -> Option<&'a M> {
    skips.iter().find(|matcher| matches_anywhere(*matcher, ty))
}

/// Filter an environment in place with the structural matcher.
pub fn filter(env: &mut Environment, skips: &SkipTypes) -> FilterReport {
    TypeFilter::new(skips).apply(env)
}
