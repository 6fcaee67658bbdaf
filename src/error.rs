//! Error types and exit codes for the typefilter CLI.
//!
//! `TypefilterError` is the single error type rendered as JSON output. Errors
//! from the core (configuration shape, pattern syntax) and from the host
//! (file I/O, model parsing) are bridged into it with `From` impls.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments (bad flags, unparsable patterns)
//! - `3`: Input errors (configuration or model file unreadable or malformed)
//! - `4`: Write errors (filtered model could not be written)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use typefilter_core::{ConfigError, PatternError};

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Configuration or model input could not be used.
    InputError = 3,
    /// The filtered model could not be written.
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum TypefilterError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A type pattern could not be parsed.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Skip types have the wrong shape.
    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// A configuration file could not be parsed.
    #[error("cannot parse configuration {}: {message}", path.display())]
    ConfigSyntax { path: PathBuf, message: String },

    /// The description model could not be parsed.
    #[error("cannot parse description model {}: {message}", path.display())]
    Model { path: PathBuf, message: String },

    /// Reading an input file failed.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the filtered model failed.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl TypefilterError {
    /// Create an invalid-arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TypefilterError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TypefilterError::InternalError {
            message: message.into(),
        }
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        TypefilterError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        TypefilterError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TypefilterError> for OutputErrorCode {
    fn from(err: &TypefilterError) -> Self {
        match err {
            TypefilterError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TypefilterError::Pattern(_) => OutputErrorCode::InvalidArguments,
            TypefilterError::Config { .. } => OutputErrorCode::InputError,
            TypefilterError::ConfigSyntax { .. } => OutputErrorCode::InputError,
            TypefilterError::Model { .. } => OutputErrorCode::InputError,
            TypefilterError::Read { .. } => OutputErrorCode::InputError,
            TypefilterError::Write { .. } => OutputErrorCode::WriteError,
            TypefilterError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}
