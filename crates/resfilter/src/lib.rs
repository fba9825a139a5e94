//! resfilter - command line front door for resource filters.
//!
//! ## Modules
//!
//! - `cli` - command implementations
//! - `config` - named filter configuration
//! - `error` - CLI error type and exit codes
//! - `output` - JSON response types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

// Re-export core types for convenience
pub use resfilter_core::{decode, encode, DecodeError, FilterSet, ResourceFilter, Rule};
