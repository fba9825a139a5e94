//! JSON responses written by the CLI.
//!
//! Every command writes exactly one response object to stdout. Successful
//! responses carry `"status": "ok"`, failures an [`ErrorResponse`] with
//! `"status": "error"`.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{CliError, OutputErrorCode};

/// Schema version for compatibility.
pub const SCHEMA_VERSION: &str = "1";

/// Response for the check command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Configuration name of the filter, if it was given as `@name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical text of the filter.
    pub filter: String,
    /// Restriction polarity of the filter.
    pub restriction: bool,
}

impl CheckResponse {
    pub fn new(name: Option<String>, filter: String, restriction: bool) -> Self {
        CheckResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            name,
            filter,
            restriction,
        }
    }
}

/// Verdict of a filter for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    pub path: String,
    pub accepted: bool,
    /// Accepted only as an ancestor of targets (tree filters).
    pub intermediate: bool,
}

/// Response for the eval command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical text of the filter.
    pub filter: String,
    /// One result per resource, in file order.
    pub results: Vec<EvalResult>,
    /// Number of accepted resources.
    pub accepted: usize,
}

impl EvalResponse {
    pub fn new(name: Option<String>, filter: String, results: Vec<EvalResult>) -> Self {
        let accepted = results.iter().filter(|r| r.accepted).count();
        EvalResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            name,
            filter,
            results,
            accepted,
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the exit code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a CliError.
    pub fn from_error(err: &CliError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Response for a failed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a CliError.
    pub fn from_error(err: &CliError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
