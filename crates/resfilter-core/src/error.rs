//! Error types for resfilter.
//!
//! Two concerns produce errors:
//! - **Decoding**: turning filter text back into a predicate tree (`DecodeError`)
//! - **Attribute reads**: a resource that cannot provide an attribute (`AttributeError`)
//!
//! Attribute errors never escape a predicate's `accept`; predicates log them and
//! treat the resource as not accepted.

use thiserror::Error;
use winnow::error::{ContextError, ParseError};

/// Longest fragment of the input quoted back in a syntax error.
const FRAGMENT_LIMIT: usize = 40;

/// Error type for decoding filter text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input was empty or blank.
    #[error("empty filter expression")]
    Empty,

    /// The input does not follow the grammar.
    #[error("invalid filter at offset {offset} near '{fragment}': {message}")]
    Syntax {
        fragment: String,
        offset: usize,
        message: String,
    },

    /// A pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A white- or blacklist was given no patterns.
    #[error("string filter '{filter}' has no patterns")]
    EmptyPatternList { filter: String },

    /// The argument of `Type(...)` is not `+[..]`, `-[..]`, `[..]` or a bare list.
    #[error("malformed type list '{text}': {message}")]
    MalformedTypeList { text: String, message: String },
}

impl DecodeError {
    /// Build a syntax error for `input` failing at byte `offset`.
    pub fn syntax(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let rest = input.get(offset..).unwrap_or_default();
        let fragment: String = rest.chars().take(FRAGMENT_LIMIT).collect();
        DecodeError::Syntax {
            fragment,
            offset,
            message: message.into(),
        }
    }

    /// Convert a parser failure into a decode error.
    ///
    /// Errors raised by nested decoders (bad patterns, bad type lists) travel
    /// through the parser as the failure's cause and are returned unchanged.
    pub(crate) fn from_parse_error(input: &str, err: &ParseError<&str, ContextError>) -> Self {
        if let Some(nested) = err
            .inner()
            .cause()
            .and_then(|cause| cause.downcast_ref::<DecodeError>())
        {
            return nested.clone();
        }
        let message = err.inner().to_string().replace('\n', "; ");
        let message = if message.trim().is_empty() {
            "unexpected input".to_string()
        } else {
            message
        };
        DecodeError::syntax(input, err.offset(), message)
    }
}

/// Error type for reading resource attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The attribute is not available for this kind of resource.
    #[error("attribute '{attribute}' is not available for '{path}'")]
    Unavailable { path: String, attribute: String },

    /// The backing store failed while reading the attribute.
    #[error("failed to read '{attribute}' of '{path}': {message}")]
    ReadFailed {
        path: String,
        attribute: String,
        message: String,
    },
}
