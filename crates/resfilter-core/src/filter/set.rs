//! Filter sets: predicates combined under a [`Rule`].

use std::sync::OnceLock;

use super::codec::decode;
use super::predicate::ResourceFilter;
use crate::error::DecodeError;
use crate::resource::Resource;
use crate::rule::Rule;
use crate::string_filter::{StringFilter, ValueFilter};

/// An ordered list of resource filters combined by a rule.
///
/// The set's restriction polarity is derived from its filters on first use and
/// cached; the filters cannot change afterwards.
#[derive(Debug, Clone)]
pub struct FilterSet<F = StringFilter> {
    rule: Rule,
    filters: Vec<ResourceFilter<F>>,
    restriction: OnceLock<bool>,
}

impl<F: ValueFilter> FilterSet<F> {
    /// Combine `filters` under `rule`.
    pub fn new(rule: Rule, filters: Vec<ResourceFilter<F>>) -> Self {
        FilterSet {
            rule,
            filters,
            restriction: OnceLock::new(),
        }
    }

    /// Decode each text into a filter and combine them under `rule`.
    ///
    /// `All()` entries are dropped: they carry no information for any rule
    /// that callers build from text lists.
    pub fn from_texts<I, S>(rule: Rule, texts: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Vec::new();
        for text in texts {
            let filter = decode::<F>(text.as_ref())?;
            if !matches!(filter, ResourceFilter::All) {
                filters.push(filter);
            }
        }
        Ok(FilterSet::new(rule, filters))
    }

    /// The combination rule.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// The combined filters, in declaration order.
    pub fn filters(&self) -> &[ResourceFilter<F>] {
        &self.filters
    }

    /// Returns true if the combination of the filters accepts the resource.
    pub fn accept(&self, resource: Option<&dyn Resource>) -> bool {
        self.rule.combine(
            &self.filters,
            |filter| filter.accept(resource),
            |filter| filter.is_restriction(),
        )
    }

    /// Heuristic polarity of the set, see [`Rule::restriction`].
    ///
    /// Don't rely on it for sets nested in `first` or `last` sets, except for
    /// `none` sets with a single filter.
    pub fn is_restriction(&self) -> bool {
        *self.restriction.get_or_init(|| {
            self.rule
                .restriction(&self.filters, |filter| filter.is_restriction())
        })
    }

    /// Returns true if this is a `tree` set whose target filter (the first one)
    /// rejects the resource while one of the ancestor filters accepts it.
    ///
    /// Tree traversals use this to mark resources that are shown only to keep
    /// the path to a target visible. This is stricter than testing the target
    /// alone: a resource rejected by every filter is not intermediate, since the
    /// set does not show it at all.
    pub fn is_intermediate(&self, resource: Option<&dyn Resource>) -> bool {
        match (self.rule, self.filters.split_first()) {
            (Rule::Tree, Some((target, ancestors))) => {
                !target.accept(resource) && ancestors.iter().any(|f| f.accept(resource))
            }
            _ => false,
        }
    }
}
