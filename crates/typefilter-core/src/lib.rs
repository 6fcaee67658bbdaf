//! Core of typefilter: removing members with unwanted types from a
//! description model.
//!
//! This crate provides:
//! - `TypeExpr`, the recursive type expression carried by descriptions
//! - Tuple notation parsing for type patterns
//! - Pluggable type matchers with exact and anywhere matching
//! - The description model (environment, classes, attributes, methods)
//! - Skip-type configuration shapes
//! - The filter engine and its removal report

pub mod error;
pub mod filter;
pub mod matcher;
pub mod model;
pub mod pattern;
pub mod skiptypes;
pub mod types;

pub use error::{ConfigError, PatternError};
pub use filter::{filter, FilterReport, MatchSite, Removal, RemovedMember, TypeFilter};
pub use matcher::{flatten, matches_anywhere, ExactMatcher, MatchOutcome, TypeMatcher, MATCH_ANY};
pub use model::{ClassDesc, Description, Environment, MethodKey, Methods, Param};
pub use pattern::{parse_pattern, parse_type_expr};
pub use skiptypes::SkipTypes;
pub use types::TypeExpr;
