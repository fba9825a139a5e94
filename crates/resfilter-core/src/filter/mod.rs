//! Resource filters: predicates over resources, filter sets and their text form.
//!
//! A [`ResourceFilter`] is either a leaf predicate testing one attribute of a
//! resource, or a [`FilterSet`] combining other filters under a [`Rule`].
//! Every filter has a canonical text form produced by [`encode`] and read back
//! by [`decode`].
//!
//! ## Usage
//!
//! ```
//! use resfilter_core::filter::{decode, ResourceFilter};
//! use resfilter_core::memory::MemoryResource;
//!
//! let filter: ResourceFilter = decode("and{PrimaryType(+'^nt:file$'),Name(+'\\.png$')}").unwrap();
//!
//! let logo = MemoryResource::new("logo.png").with_primary_type("nt:file");
//! let readme = MemoryResource::new("README").with_primary_type("nt:file");
//! assert!(filter.accept(Some(&logo)));
//! assert!(!filter.accept(Some(&readme)));
//! ```
//!
//! [`Rule`]: crate::rule::Rule

mod codec;
mod predicate;
mod set;

// Re-export public API from codec module
pub use codec::{decode, encode};

// Re-export public API from predicate module
pub use predicate::{ResourceFilter, TypeFilter, FOLDER_PATTERN};

// Re-export public API from set module
pub use set::FilterSet;
