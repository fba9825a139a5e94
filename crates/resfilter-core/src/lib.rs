//! Core library for resfilter.
//!
//! This crate provides composable predicates over hierarchical content
//! resources:
//! - The `Resource` abstraction that filters read attributes from
//! - String filters (regex white- and blacklists) and their text form
//! - Combination rules shared by string filters and resource filters
//! - Resource filters, filter sets and their text form
//! - An in-memory resource tree for tests and the CLI
//! - Error types

pub mod error;
pub mod filter;
pub mod memory;
pub mod resource;
pub mod rule;
pub mod string_filter;

pub use error::{AttributeError, DecodeError};
pub use filter::{decode, encode, FilterSet, ResourceFilter, TypeFilter};
pub use resource::Resource;
pub use rule::Rule;
pub use string_filter::{StringFilter, ValueFilter};
