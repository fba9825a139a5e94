//! Error types for the resfilter CLI.
//!
//! Every failure of a command is a [`CliError`]. Each variant maps to an
//! [`OutputErrorCode`], which is both the `code` of the JSON error response
//! and the process exit code.

use std::fmt;
use std::path::PathBuf;

use resfilter_core::DecodeError;
use thiserror::Error;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable error codes for JSON output and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (malformed filter text, bad flags).
    InvalidArguments = 2,
    /// Something the arguments refer to could not be found or read
    /// (named filter, configuration file, resources file).
    ResolutionError = 3,
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

/// Error type for CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A filter argument could not be decoded.
    #[error("invalid filter '{text}': {source}")]
    InvalidFilter {
        text: String,
        #[source]
        source: DecodeError,
    },

    /// `@name` refers to a filter the configuration does not define.
    #[error("no filter named '{name}' in the configuration")]
    UnknownFilter { name: String },

    /// A configuration file could not be read or parsed.
    #[error("failed to load configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A resources file could not be read or parsed.
    #[error("failed to load resources {}: {message}", path.display())]
    Resources { path: PathBuf, message: String },

    /// Writing the response failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CliError::InvalidArguments {
            message: message.into(),
        }
    }
}

impl From<&CliError> for OutputErrorCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CliError::InvalidFilter { .. } => OutputErrorCode::InvalidArguments,
            CliError::UnknownFilter { .. } => OutputErrorCode::ResolutionError,
            CliError::Config { .. } => OutputErrorCode::ResolutionError,
            CliError::Resources { .. } => OutputErrorCode::ResolutionError,
            CliError::Output(_) => OutputErrorCode::InternalError,
        }
    }
}
