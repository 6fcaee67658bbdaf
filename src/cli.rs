//! Command implementations shared by the binary and tests.
//!
//! Each command returns a serializable response; the binary is only
//! responsible for argument parsing, logging setup and printing.

use std::fs;
use std::path::{Path, PathBuf};

use typefilter_core::{
    flatten, matches_anywhere, parse_pattern, parse_type_expr, Environment, ExactMatcher, TypeFilter,
    TypeMatcher,
};

use crate::config::{CliOverrides, ResolvedConfig};
use crate::error::TypefilterError;
use crate::output::{FilterResponse, MatchResponse, SCHEMA_VERSION};

/// Where the filtered model goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Report only; nothing is written.
    DryRun,
    /// Overwrite the input model.
    InPlace,
    /// Write to a separate file.
    Path(PathBuf),
}

/// Options for the `filter` command.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Working directory for relative paths and config discovery.
    pub cwd: PathBuf,
    /// Description model to filter (JSON).
    pub model: PathBuf,
    /// Where to write the result.
    pub target: WriteTarget,
    /// Configuration overrides from CLI flags.
    pub overrides: CliOverrides,
}

/// Load a description model from a JSON file.
pub fn load_model(path: &Path) -> Result<Environment, TypefilterError> {
    let text = fs::read_to_string(path).map_err(|e| TypefilterError::read(path, e))?;
    serde_json::from_str(&text).map_err(|e| TypefilterError::Model {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a description model as pretty-printed JSON.
pub fn write_model(path: &Path, env: &Environment) -> Result<(), TypefilterError> {
    let mut json = serde_json::to_string_pretty(env)
        .map_err(|e| TypefilterError::internal(format!("cannot serialize model: {}", e)))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| TypefilterError::write(path, e))
}

/// Run the `filter` command.
pub fn run_filter(options: &FilterOptions) -> Result<FilterResponse, TypefilterError> {
    let resolved = ResolvedConfig::resolve(&options.cwd, &options.overrides)?;
    run_filter_resolved(options, resolved)
}

/// Run the `filter` command with already-resolved configuration.
pub fn run_filter_resolved(
    options: &FilterOptions,
    resolved: ResolvedConfig,
) -> Result<FilterResponse, TypefilterError> {
    let model_path = options.cwd.join(&options.model);
    let mut env = load_model(&model_path)?;

    let skiptypes = resolved.skiptypes;
    tracing::debug!(
        "Filtering {} with {} skip type(s) from {:?}",
        model_path.display(),
        skiptypes.value.pattern_count(),
        skiptypes.source
    );

    let report = TypeFilter::new(&skiptypes.value).apply(&mut env);

    let written = match &options.target {
        WriteTarget::DryRun => None,
        WriteTarget::InPlace if report.is_empty() => {
            tracing::info!("Nothing removed, leaving {} untouched", model_path.display());
            None
        }
        WriteTarget::InPlace => Some(model_path),
        WriteTarget::Path(path) => Some(options.cwd.join(path)),
    };
    if let Some(path) = &written {
        write_model(path, &env)?;
        tracing::info!("Wrote filtered model to {}", path.display());
    }

    Ok(FilterResponse::new(
        skiptypes.source,
        skiptypes.value,
        report,
        written.map(|p| p.display().to_string()),
    ))
}

/// Run the `match` command: explain how a pattern treats a type.
pub fn run_match(pattern: &str, candidate: &str) -> Result<MatchResponse, TypefilterError> {
    let matcher = ExactMatcher::new(parse_pattern(pattern)?);
    let candidate = parse_type_expr(candidate)?;

    Ok(MatchResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        pattern: matcher.pattern().to_string(),
        candidate: candidate.to_string(),
        exact: matcher.matches(&candidate),
        anywhere: matches_anywhere(&matcher, &candidate),
        leaves: flatten(&candidate).iter().map(|l| l.to_string()).collect(),
    })
}
