//! Configuration resolution for the typefilter CLI.
//!
//! Skip types can come from a configuration file or from CLI flags. Every
//! resolved value records where it came from so that responses can report it.
//!
//! ## Config File
//!
//! TOML (or JSON when the file ends in `.json`) with a single `skiptypes`
//! key:
//!
//! ```toml
//! skiptypes = ["uint32", [["vector", "float64", "const"], "&"]]
//! ```
//!
//! ## Precedence
//!
//! Config file path (highest to lowest):
//! 1. `--config` flag
//! 2. `TYPEFILTER_CONFIG` environment variable
//! 3. `typefilter.toml` in the working directory, if present
//!
//! Skip types (highest to lowest):
//! 1. `--skip` / `--skip-for` flags
//! 2. Config file
//! 3. Unset

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typefilter_core::{parse_pattern, SkipTypes};

use crate::error::TypefilterError;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TYPEFILTER_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "typefilter.toml";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the default config file in the working directory.
    ProjectConfig = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Config File
// ============================================================================

/// On-disk configuration. Unknown keys are ignored so the file can be shared
/// with other pipeline stages.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    skiptypes: Option<Value>,
}

/// Load skip types from a TOML or JSON config file.
pub fn load_config_file(path: &Path) -> Result<SkipTypes, TypefilterError> {
    let text = fs::read_to_string(path).map_err(|e| TypefilterError::read(path, e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let file: ConfigFile = if is_json {
        serde_json::from_str(&text).map_err(|e| TypefilterError::ConfigSyntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        toml::from_str(&text).map_err(|e| TypefilterError::ConfigSyntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let raw = file.skiptypes.unwrap_or(Value::Null);
    SkipTypes::from_value(&raw).map_err(|source| TypefilterError::Config {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --config flag.
    pub config: Option<PathBuf>,
    /// --skip flags (tuple notation), applied to every class.
    pub skip: Vec<String>,
    /// --skip-for flags in `<Class>=<pattern>` form.
    pub skip_for: Vec<String>,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Config file that was loaded, if any.
    pub config_path: Option<ConfigValue<PathBuf>>,
    /// Effective skip types.
    pub skiptypes: ConfigValue<SkipTypes>,
}

impl ResolvedConfig {
    /// Resolve configuration from all sources, reading `TYPEFILTER_CONFIG`.
    pub fn resolve(cwd: &Path, overrides: &CliOverrides) -> Result<Self, TypefilterError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::resolve_with_env(cwd, overrides, env_path)
    }

    /// Resolve configuration with an explicit environment value.
    pub fn resolve_with_env(
        cwd: &Path,
        overrides: &CliOverrides,
        env_path: Option<PathBuf>,
    ) -> Result<Self, TypefilterError> {
        let config_path = Self::resolve_config_path(cwd, overrides, env_path);

        let mut skiptypes = ConfigValue::new(SkipTypes::Unset, ConfigSource::Default);
        if let Some(path) = &config_path {
            tracing::debug!("Loading skip types from {}", path.value.display());
            let loaded = load_config_file(&path.value)?;
            skiptypes = skiptypes.merge(ConfigValue::new(loaded, path.source));
        }

        if let Some(cli) = skiptypes_from_flags(overrides)? {
            skiptypes = skiptypes.merge(ConfigValue::new(cli, ConfigSource::CliFlag));
        }

        Ok(ResolvedConfig {
            config_path,
            skiptypes,
        })
    }

    fn resolve_config_path(
        cwd: &Path,
        overrides: &CliOverrides,
        env_path: Option<PathBuf>,
    ) -> Option<ConfigValue<PathBuf>> {
        if let Some(path) = &overrides.config {
            return Some(ConfigValue::new(cwd.join(path), ConfigSource::CliFlag));
        }
        if let Some(path) = env_path {
            return Some(ConfigValue::new(cwd.join(path), ConfigSource::EnvVar));
        }
        let default = cwd.join(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            return Some(ConfigValue::new(default, ConfigSource::ProjectConfig));
        }
        None
    }
}

/// Build skip types from `--skip` / `--skip-for`, if any were given.
fn skiptypes_from_flags(overrides: &CliOverrides) -> Result<Option<SkipTypes>, TypefilterError> {
    match (overrides.skip.is_empty(), overrides.skip_for.is_empty()) {
        (true, true) => Ok(None),
        (false, false) => Err(TypefilterError::invalid_args(
            "--skip and --skip-for cannot be combined: skip types are either global or per class",
        )),
        (false, true) => {
            let patterns = overrides
                .skip
                .iter()
                .map(|p| parse_pattern(p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(SkipTypes::Global(patterns)))
        }
        (true, false) => {
            let mut per_class: BTreeMap<String, Vec<_>> = BTreeMap::new();
            for entry in &overrides.skip_for {
                let (class, pattern) = parse_skip_for(entry)?;
                per_class
                    .entry(class.to_string())
                    .or_default()
                    .push(parse_pattern(pattern)?);
            }
            Ok(Some(SkipTypes::PerClass(per_class)))
        }
    }
}

/// Split a `<Class>=<pattern>` flag value.
fn parse_skip_for(entry: &str) -> Result<(&str, &str), TypefilterError> {
    match entry.split_once('=') {
        Some((class, pattern)) if !class.trim().is_empty() && !pattern.trim().is_empty() => {
            Ok((class.trim(), pattern))
        }
        _ => Err(TypefilterError::invalid_args(format!(
            "invalid --skip-for '{}', expected '<Class>=<pattern>' (e.g., 'classA=float64')",
            entry
        ))),
    }
}
