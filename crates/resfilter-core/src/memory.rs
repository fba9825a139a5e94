//! In-memory resources.
//!
//! `MemoryResource` is a plain data implementation of [`Resource`], built either
//! with the `with_*` builder methods or deserialized from JSON:
//!
//! ```json
//! {
//!   "name": "logo.png",
//!   "primary_type": "nt:file",
//!   "node_super_types": ["nt:hierarchyNode", "nt:base"],
//!   "mixins": ["mix:referenceable"],
//!   "children": [
//!     { "name": "jcr:content", "primary_type": "nt:resource",
//!       "properties": { "jcr:mimeType": "image/png" } }
//!   ]
//! }
//! ```
//!
//! Paths are derived from the parent chain. A root takes its `path` from the
//! document when one is given, `/<name>` otherwise.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AttributeError;
use crate::resource::Resource;

/// Attribute name reported when mixin types cannot be read.
const MIXIN_ATTRIBUTE: &str = "jcr:mixinTypes";

/// A resource held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryResource {
    /// Last path segment.
    pub name: String,
    /// Absolute path (derived for children).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    path: String,
    /// Declared primary type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<String>,
    /// Declared resource type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Resource types the resource type derives from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_super_types: Vec<String>,
    /// Node types the primary type inherits from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_super_types: Vec<String>,
    /// Applied mixin types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    /// Synthetic resources have no backing node; their mixins cannot be read.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
    /// String properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// Child resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MemoryResource>,
}

/// A resources document: one resource or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceDocument {
    Many(Vec<MemoryResource>),
    One(MemoryResource),
}

impl MemoryResource {
    /// Create a root resource at `/<name>`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        MemoryResource {
            path: join_path("/", &name),
            name,
            ..Default::default()
        }
    }

    /// Move the resource (and its children) to `path`.
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.reroot(path.into());
        self
    }

    pub fn with_primary_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_type = Some(primary_type.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_resource_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.resource_super_types.push(super_type.into());
        self
    }

    pub fn with_node_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.node_super_types.push(super_type.into());
        self
    }

    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.push(mixin.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a child; its path is placed below this resource.
    pub fn with_child(mut self, mut child: MemoryResource) -> Self {
        child.reroot(join_path(&self.path, &child.name));
        self.children.push(child);
        self
    }

    /// Mark the resource as synthetic (no readable mixin types).
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Parse a JSON document holding one resource or an array of resources.
    pub fn from_json(json: &str) -> Result<Vec<MemoryResource>, serde_json::Error> {
        let roots = match serde_json::from_str(json)? {
            ResourceDocument::Many(roots) => roots,
            ResourceDocument::One(root) => vec![root],
        };
        Ok(roots
            .into_iter()
            .map(|mut root| {
                let path = if root.path.is_empty() {
                    join_path("/", &root.name)
                } else {
                    root.path.clone()
                };
                root.reroot(path);
                root
            })
            .collect())
    }

    fn reroot(&mut self, path: String) {
        for child in &mut self.children {
            child.reroot(join_path(&path, &child.name));
        }
        self.path = path;
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

impl Resource for MemoryResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn primary_type(&self) -> Option<&str> {
        self.primary_type.as_deref()
    }

    fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    fn is_resource_type(&self, resource_type: &str) -> bool {
        self.resource_type.as_deref() == Some(resource_type)
            || self.resource_super_types.iter().any(|t| t == resource_type)
            || self.primary_type.as_deref() == Some(resource_type)
    }

    fn is_node_type(&self, node_type: &str) -> bool {
        self.primary_type.as_deref() == Some(node_type)
            || self.node_super_types.iter().any(|t| t == node_type)
            || self.mixins.iter().any(|t| t == node_type)
    }

    fn mixin_types(&self) -> Result<Vec<String>, AttributeError> {
        if self.synthetic {
            return Err(AttributeError::Unavailable {
                path: self.path.clone(),
                attribute: MIXIN_ATTRIBUTE.to_string(),
            });
        }
        Ok(self.mixins.clone())
    }

    fn child(&self, name: &str) -> Option<&dyn Resource> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c as &dyn Resource)
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::CONTENT_NODE;

    #[test]
    fn test_builder_derives_child_paths() {
        let file = MemoryResource::new("logo.png")
            .with_child(MemoryResource::new(CONTENT_NODE))
            .at_path("/content/dam/logo.png");

        assert_eq!(file.path(), "/content/dam/logo.png");
        let content = file.child(CONTENT_NODE).unwrap();
        assert_eq!(content.path(), "/content/dam/logo.png/jcr:content");
    }

    #[test]
    fn test_from_json_single_and_array() {
        let one = MemoryResource::from_json(r#"{"name":"a","primary_type":"nt:folder"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].path(), "/a");

        let many = MemoryResource::from_json(
            r#"[{"name":"a"},{"name":"b","path":"/content/b","children":[{"name":"c"}]}]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].path(), "/content/b");
        assert_eq!(many[1].child("c").unwrap().path(), "/content/b/c");
    }

    #[test]
    fn test_type_checks() {
        let page = MemoryResource::new("home")
            .with_primary_type("cq:Page")
            .with_resource_type("app/components/page")
            .with_resource_super_type("foundation/page")
            .with_node_super_type("nt:hierarchyNode")
            .with_mixin("mix:versionable");

        assert!(page.is_resource_type("app/components/page"));
        assert!(page.is_resource_type("foundation/page"));
        assert!(page.is_resource_type("cq:Page"));
        assert!(!page.is_resource_type("nt:hierarchyNode"));

        assert!(page.is_node_type("cq:Page"));
        assert!(page.is_node_type("nt:hierarchyNode"));
        assert!(page.is_node_type("mix:versionable"));
        assert!(!page.is_node_type("nt:file"));
    }

    #[test]
    fn test_synthetic_mixins_unavailable() {
        let synthetic = MemoryResource::new("virtual").synthetic();
        let err = synthetic.mixin_types().unwrap_err();
        assert!(matches!(err, AttributeError::Unavailable { .. }));

        let plain = MemoryResource::new("plain").with_mixin("mix:title");
        assert_eq!(plain.mixin_types().unwrap(), vec!["mix:title".to_string()]);
    }
}
