//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core (re-exported from typefilter-core)
// ============================================================================

// types module - type expressions
use typefilter::types::TypeExpr;

// pattern module - tuple notation parsing
use typefilter::pattern::{parse_pattern, parse_type_expr};

// matcher module - matcher capability and anywhere matching
use typefilter::matcher::{
    flatten, matches_anywhere, ExactMatcher, MatchOutcome, TypeMatcher, MATCH_ANY,
};

// model module - description model
use typefilter::model::{ClassDesc, Description, Environment, MethodKey, Methods, Param};

// skiptypes module - skip-type configuration
use typefilter::skiptypes::SkipTypes;

// filter module - the engine and its report
use typefilter::filter::{filter, FilterReport, MatchSite, Removal, RemovedMember, TypeFilter};

// core errors
use typefilter::core_error::{ConfigError, PatternError};

// ============================================================================
// Host
// ============================================================================

use typefilter::cli::{
    load_model, run_filter, run_filter_resolved, run_match, write_model, FilterOptions,
    WriteTarget,
};
use typefilter::config::{
    load_config_file, CliOverrides, ConfigSource, ConfigValue, ResolvedConfig, CONFIG_ENV_VAR,
    DEFAULT_CONFIG_FILE,
};
use typefilter::error::{OutputErrorCode, TypefilterError};
use typefilter::output::{
    emit_response, ErrorInfo, ErrorResponse, FilterResponse, MatchResponse, Summary,
    SCHEMA_VERSION,
};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // This test exists only to verify imports compile.
    let _ = std::any::type_name::<TypeExpr>();
    let _ = std::any::type_name::<TypeFilter>();
    let _ = std::any::type_name::<Environment>();
    let _ = std::any::type_name::<SkipTypes>();
    let _ = std::any::type_name::<TypefilterError>();
    let _ = std::any::type_name::<ResolvedConfig>();
}

#[test]
fn schema_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
}

#[test]
fn config_names_are_stable() {
    assert_eq!(CONFIG_ENV_VAR, "TYPEFILTER_CONFIG");
    assert_eq!(DEFAULT_CONFIG_FILE, "typefilter.toml");
    assert_eq!(MATCH_ANY, "?");
}
