//! The resource capability consumed by filters.
//!
//! Filters never own or traverse resources; they read a handful of attributes
//! through the [`Resource`] trait. Implementations adapt whatever hierarchy the
//! caller holds (a repository, a file tree, the in-memory
//! [`MemoryResource`](crate::memory::MemoryResource)).

use crate::error::AttributeError;

/// Name of the child that carries the content of a resource.
pub const CONTENT_NODE: &str = "jcr:content";

/// Property holding a resource's media type.
pub const PROP_MIME_TYPE: &str = "jcr:mimeType";

/// Marks a type token as a type-hierarchy query instead of a plain type name.
pub const NODE_TYPE_PREFIX: &str = "node:";

/// Read-only view of a hierarchical, attributed entity.
///
/// Attributes a resource cannot provide are reported as absent (`None`,
/// `false`, or an [`AttributeError`] for mixins) rather than by panicking.
pub trait Resource {
    /// Last path segment.
    fn name(&self) -> &str;

    /// Absolute path of the resource.
    fn path(&self) -> &str;

    /// Declared primary type, if any.
    fn primary_type(&self) -> Option<&str>;

    /// Declared resource type, if any.
    fn resource_type(&self) -> Option<&str>;

    /// Returns true if the resource is of `resource_type` or a type derived from it.
    fn is_resource_type(&self, resource_type: &str) -> bool;

    /// Type hierarchy query: returns true if the resource's node type is
    /// `node_type` or inherits from it.
    fn is_node_type(&self, node_type: &str) -> bool;

    /// Names of the mixin types applied to the resource.
    fn mixin_types(&self) -> Result<Vec<String>, AttributeError>;

    /// Direct child by name.
    fn child(&self, name: &str) -> Option<&dyn Resource>;

    /// Named string attribute.
    fn property(&self, name: &str) -> Option<&str>;
}

/// Returns the value if it is present and not blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
