//! Resource filter types and evaluation.
//!
//! This module provides the predicate kinds for resource filtering. Each leaf
//! predicate tests one attribute of a resource; sets combine predicates.
//!
//! ## Predicate Kinds
//!
//! - `All` - any resource
//! - `Folder` - primary type is a folder type (`sling:Folder`, `nt:folder`, ...)
//! - `Type` - resource type or type hierarchy, from an explicit token list
//! - `Name` - resource name
//! - `Path` - resource path
//! - `PrimaryType` - declared primary type
//! - `MixinType` - applied mixin types
//! - `ResourceType` - resource type, falling back to the content child
//! - `MimeType` - media type property, falling back to the content child
//! - `Set` - a [`FilterSet`] combining predicates under a rule
//!
//! Every predicate rejects an absent resource, except sets, whose result for
//! an absent resource follows their rule (a `none` set accepts it).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::set::FilterSet;
use crate::error::DecodeError;
use crate::resource::{non_blank, Resource, CONTENT_NODE, NODE_TYPE_PREFIX, PROP_MIME_TYPE};
use crate::string_filter::{StringFilter, ValueFilter};

/// Primary types accepted by the folder filter.
pub const FOLDER_PATTERN: &str = "^(sling|nt):.*[Ff]older$";

static FOLDER_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(FOLDER_PATTERN).unwrap());

/// A predicate over resources.
///
/// `F` is the value filter used by the attribute predicates.
#[derive(Debug, Clone)]
pub enum ResourceFilter<F = StringFilter> {
    /// Accepts every resource.
    All,
    /// Accepts resources whose primary type is a folder type.
    Folder,
    /// Accepts resources matching a list of type tokens.
    Type(TypeFilter),
    /// Tests the resource name.
    Name(F),
    /// Tests the resource path.
    Path(F),
    /// Tests the primary type.
    PrimaryType(F),
    /// Tests the mixin types.
    MixinType(F),
    /// Tests the resource type (own, else the content child's).
    ResourceType(F),
    /// Tests the media type (own, else the content child's).
    MimeType(F),
    /// Combines predicates under a rule.
    Set(FilterSet<F>),
}

impl<F: ValueFilter> ResourceFilter<F> {
    /// The predefined filter accepting each resource.
    // Leaf variants carry no set, so no cache is ever shared through the const.
    #[allow(clippy::declare_interior_mutable_const)]
    pub const ALL: Self = ResourceFilter::All;

    /// The predefined filter for folders.
    #[allow(clippy::declare_interior_mutable_const)]
    pub const FOLDER: Self = ResourceFilter::Folder;

    /// Returns true if the resource is appropriate for this filter.
    pub fn accept(&self, resource: Option<&dyn Resource>) -> bool {
        match self {
            ResourceFilter::Set(set) => set.accept(resource),
            leaf => resource.is_some_and(|resource| leaf.accept_present(resource)),
        }
    }

    fn accept_present(&self, resource: &dyn Resource) -> bool {
        match self {
            ResourceFilter::All => true,
            ResourceFilter::Folder => {
                non_blank(resource.primary_type()).is_some_and(|t| FOLDER_TYPE.is_match(t))
            }
            ResourceFilter::Type(filter) => filter.accept(resource),
            ResourceFilter::Name(filter) => filter.accept(resource.name()),
            ResourceFilter::Path(filter) => filter.accept(resource.path()),
            ResourceFilter::PrimaryType(filter) => {
                non_blank(resource.primary_type()).is_some_and(|t| filter.accept(t))
            }
            ResourceFilter::MixinType(filter) => accept_mixin_types(filter, resource),
            ResourceFilter::ResourceType(filter) => {
                own_or_content(resource, |r| non_blank(r.resource_type()))
                    .is_some_and(|t| filter.accept(t))
            }
            ResourceFilter::MimeType(filter) => {
                own_or_content(resource, |r| non_blank(r.property(PROP_MIME_TYPE)))
                    .is_some_and(|t| filter.accept(t))
            }
            ResourceFilter::Set(set) => set.accept(Some(resource)),
        }
    }

    /// Returns true if the filter primarily excludes resources (a blacklist).
    pub fn is_restriction(&self) -> bool {
        match self {
            ResourceFilter::All | ResourceFilter::Folder => false,
            ResourceFilter::Type(filter) => filter.is_restriction(),
            ResourceFilter::Name(filter)
            | ResourceFilter::Path(filter)
            | ResourceFilter::PrimaryType(filter)
            | ResourceFilter::MixinType(filter)
            | ResourceFilter::ResourceType(filter)
            | ResourceFilter::MimeType(filter) => filter.is_restriction(),
            ResourceFilter::Set(set) => set.is_restriction(),
        }
    }

    /// Returns true if a `tree` set shows the resource only as an ancestor of
    /// targets. Always false for other filters.
    pub fn is_intermediate(&self, resource: Option<&dyn Resource>) -> bool {
        match self {
            ResourceFilter::Set(set) => set.is_intermediate(resource),
            _ => false,
        }
    }
}

/// Reads an attribute from the resource, else from its content child.
///
/// The fallback goes exactly one level down.
fn own_or_content<'r>(
    resource: &'r dyn Resource,
    attribute: impl Fn(&'r dyn Resource) -> Option<&'r str>,
) -> Option<&'r str> {
    attribute(resource).or_else(|| resource.child(CONTENT_NODE).and_then(&attribute))
}

/// A whitelist accepts when any mixin matches; a blacklist accepts when every
/// mixin passes it, i.e. no forbidden mixin is present.
fn accept_mixin_types<F: ValueFilter>(filter: &F, resource: &dyn Resource) -> bool {
    match resource.mixin_types() {
        Ok(mixins) => {
            if filter.is_restriction() {
                mixins.iter().all(|mixin| filter.accept(mixin))
            } else {
                mixins.iter().any(|mixin| filter.accept(mixin))
            }
        }
        Err(err) => {
            debug!(path = resource.path(), error = %err, "mixin types unavailable, resource not accepted");
            false
        }
    }
}

/// Type check against an explicit list of type tokens.
///
/// Tokens starting with [`NODE_TYPE_PREFIX`] query the type hierarchy; other
/// tokens are compared with the resource's declared types. The first matching
/// token decides: a whitelist accepts, a blacklist rejects. Without a match a
/// blacklist accepts and a whitelist rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter {
    type_names: Vec<String>,
    restriction: bool,
}

impl TypeFilter {
    /// Create a type filter from type tokens and an explicit polarity.
    ///
    /// Tokens are trimmed and empty tokens dropped. Tokens containing list
    /// syntax (`,`, `[`, `]`), parentheses, braces or quotes are rejected, since
    /// the text form could not be read back.
    pub fn new<I, S>(type_names: I, restriction: bool) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for name in type_names {
            let name = name.as_ref().trim();
            if name.contains([',', '[', ']', '(', ')', '{', '}', '\'']) {
                return Err(DecodeError::MalformedTypeList {
                    text: name.to_string(),
                    message: "type name contains list syntax".to_string(),
                });
            }
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        Ok(TypeFilter {
            type_names: names,
            restriction,
        })
    }

    /// Parse `+[a,b]` (whitelist), `-[a,b]` (blacklist), `[a,b]` or `a,b`
    /// (whitelist).
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let text = text.trim();
        let malformed = |message: &str| DecodeError::MalformedTypeList {
            text: text.to_string(),
            message: message.to_string(),
        };

        let (restriction, list) = match text.chars().next() {
            Some(sign @ ('+' | '-')) => {
                let list = text[1..]
                    .strip_prefix('[')
                    .ok_or_else(|| malformed("expected '[' after the sign"))?;
                (sign == '-', list)
            }
            Some('[') => (false, &text[1..]),
            _ => {
                if text.contains([']', '[']) {
                    return Err(malformed("unbalanced brackets"));
                }
                return TypeFilter::new(text.split(','), false);
            }
        };

        let list = list
            .strip_suffix(']')
            .ok_or_else(|| malformed("missing closing ']'"))?;
        if list.contains(['[', ']']) {
            return Err(malformed("unbalanced brackets"));
        }
        TypeFilter::new(list.split(','), restriction)
    }

    /// The type tokens, in declaration order.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// Returns true for a blacklist.
    pub fn is_restriction(&self) -> bool {
        self.restriction
    }

    /// Returns true if the resource passes the type list.
    pub fn accept(&self, resource: &dyn Resource) -> bool {
        for name in &self.type_names {
            let matched = match name.strip_prefix(NODE_TYPE_PREFIX) {
                Some(node_type) => resource.is_node_type(node_type),
                None => resource.is_resource_type(name),
            };
            if matched {
                return !self.restriction;
            }
        }
        self.restriction
    }

    /// Append the polarity and token list, e.g. `-[nt:folder,sling:Folder]`.
    pub fn encode_type_names(&self, out: &mut String) {
        out.push(if self.restriction { '-' } else { '+' });
        out.push('[');
        out.push_str(&self.type_names.join(","));
        out.push(']');
    }
}
