//! Error types for the filtering core.
//!
//! Only setup mistakes surface as errors. Malformed type expressions and
//! matcher incompatibilities found while filtering are absorbed as
//! non-matches and never reach the caller.

use thiserror::Error;

/// Skip-type configuration has the wrong shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `skiptypes` is neither a list, a mapping, nor unset.
    #[error("skiptypes must be a list of types or a mapping of class names to lists, found {found}")]
    InvalidShape { found: String },

    /// A per-class entry is not a list of types.
    #[error("skiptypes entry for class '{class}' must be a list of types, found {found}")]
    InvalidClassEntry { class: String, found: String },

    /// A pattern contains `()`, which would match every composite type.
    #[error("skiptypes pattern {pattern} at {location} contains an empty type sequence")]
    EmptyComposite { location: String, pattern: String },
}

/// Error parsing a type expression written in tuple notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// Invalid pattern syntax.
    #[error("invalid type pattern '{input}': {message}")]
    Invalid { input: String, message: String },

    /// The pattern contains `()`, which would match every composite type.
    #[error("invalid type pattern '{input}': empty tuple matches every composite type")]
    EmptyComposite { input: String },
}
