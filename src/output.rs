//! JSON output types for CLI responses.
//!
//! Every command prints exactly one JSON document to stdout. Successful
//! responses carry `"status": "ok"`; failures carry `"status": "error"` and
//! an [`ErrorInfo`] whose `code` is also the process exit code.

use std::io::{self, Write};

use serde::Serialize;
use typefilter_core::{FilterReport, MatchOutcome, Removal, SkipTypes};

use crate::config::ConfigSource;
use crate::error::{OutputErrorCode, TypefilterError};

/// Schema version for compatibility checks by consumers.
pub const SCHEMA_VERSION: &str = "1";

/// Counts for a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Classes that had an applicable skip list.
    pub classes_visited: usize,
    /// Attributes removed.
    pub attributes_removed: usize,
    /// Methods removed.
    pub methods_removed: usize,
}

impl From<&FilterReport> for Summary {
    fn from(report: &FilterReport) -> Self {
        Summary {
            classes_visited: report.classes_visited,
            attributes_removed: report.attributes_removed(),
            methods_removed: report.methods_removed(),
        }
    }
}

/// Response for the `filter` command.
#[derive(Debug, Clone, Serialize)]
pub struct FilterResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Where the skip types came from.
    pub config_source: ConfigSource,
    /// The effective skip types (null when unset).
    pub skiptypes: SkipTypes,
    /// Removal counts.
    pub summary: Summary,
    /// Every removal, in traversal order.
    pub removals: Vec<Removal>,
    /// Path the filtered model was written to; absent on a dry run or an
    /// in-place run that removed nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
}

impl FilterResponse {
    /// Create a response from a finished filter pass.
    pub fn new(
        config_source: ConfigSource,
        skiptypes: SkipTypes,
        report: FilterReport,
        written: Option<String>,
    ) -> Self {
        FilterResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            config_source,
            skiptypes,
            summary: Summary::from(&report),
            removals: report.removals,
            written,
        }
    }
}

/// Response for the `match` command.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The pattern, in tuple notation.
    pub pattern: String,
    /// The candidate type, in tuple notation.
    pub candidate: String,
    /// Outcome of the exact matcher on the whole candidate.
    pub exact: MatchOutcome,
    /// Whether the pattern matches the candidate anywhere.
    pub anywhere: bool,
    /// The candidate's flattened leaves.
    pub leaves: Vec<String>,
}

/// Error information.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Build error information from a `TypefilterError`.
    pub fn from_error(err: &TypefilterError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a `TypefilterError`.
    pub fn from_error(err: &TypefilterError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
