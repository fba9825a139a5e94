//! Combination rules for filter sets.
//!
//! A rule decides how the verdicts of an ordered list of filters merge into one
//! verdict, and how their restriction polarities merge into the set's polarity.
//! Both resource filter sets and string filter sets use these rules.
//!
//! | Rule          | accepts when                               | empty set |
//! |---------------|--------------------------------------------|-----------|
//! | `or` / `tree` | any filter accepts                         | false     |
//! | `and`         | every filter accepts                       | false     |
//! | `none`        | no filter accepts                          | true      |
//! | `first`       | first decisive filter, in order, says so   | false     |
//! | `last`        | first decisive filter, in reverse, says so | false     |
//!
//! A filter is decisive when it is a whitelist that accepts (verdict `true`) or
//! a restriction that rejects (verdict `false`). Other filters are skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the filters of a set are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// Each filter in the set must accept.
    And,
    /// At least one filter in the set must accept.
    Or,
    /// The first decisive filter determines the result.
    First,
    /// The last decisive filter determines the result.
    Last,
    /// Like `or`; the first filter is the primary target, the others only keep
    /// ancestors of targets visible.
    Tree,
    /// No filter in the set accepts. With one filter this is a negation.
    None,
}

impl Rule {
    /// Every rule, in grammar order.
    pub const ALL: [Rule; 6] = [
        Rule::And,
        Rule::Or,
        Rule::First,
        Rule::Last,
        Rule::Tree,
        Rule::None,
    ];

    /// The rule's name in the text grammar.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::And => "and",
            Rule::Or => "or",
            Rule::First => "first",
            Rule::Last => "last",
            Rule::Tree => "tree",
            Rule::None => "none",
        }
    }

    /// Parse a rule from its grammar name.
    pub fn parse(s: &str) -> Option<Self> {
        Rule::ALL.into_iter().find(|rule| rule.name() == s)
    }

    /// Combine the verdicts of `items` under this rule.
    ///
    /// `accepts` yields an item's verdict, `is_restriction` its polarity.
    /// Items are consulted in declaration order (reverse order for `last`).
    pub fn combine<T>(
        self,
        items: &[T],
        accepts: impl Fn(&T) -> bool,
        is_restriction: impl Fn(&T) -> bool,
    ) -> bool {
        match self {
            Rule::Or | Rule::Tree => items.iter().any(accepts),
            Rule::And => !items.is_empty() && items.iter().all(accepts),
            Rule::None => !items.iter().any(accepts),
            Rule::First => first_decisive(items.iter(), accepts, is_restriction),
            Rule::Last => first_decisive(items.iter().rev(), accepts, is_restriction),
        }
    }

    /// Derive the restriction polarity of a set of `items` under this rule.
    ///
    /// This is a heuristic. It is well defined for sets of leaf filters and for
    /// `none` sets with one filter; sets nested inside `first` or `last` sets
    /// may report a polarity that does not describe their behaviour.
    pub fn restriction<T>(self, items: &[T], is_restriction: impl Fn(&T) -> bool) -> bool {
        match self {
            Rule::Or | Rule::Last => items.iter().all(is_restriction),
            Rule::And | Rule::First => items.iter().any(is_restriction),
            Rule::None => !items.iter().any(is_restriction),
            Rule::Tree => match items.first() {
                Some(target) => is_restriction(target),
                None => true,
            },
        }
    }
}

fn first_decisive<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    accepts: impl Fn(&T) -> bool,
    is_restriction: impl Fn(&T) -> bool,
) -> bool {
    for item in items {
        let accepted = accepts(item);
        let restriction = is_restriction(item);
        if accepted && !restriction {
            return true;
        }
        if !accepted && restriction {
            return false;
        }
    }
    false
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
