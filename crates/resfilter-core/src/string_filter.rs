//! String filters: the value matchers wrapped by resource predicates.
//!
//! Resource predicates test one attribute (a name, a path, a type) and leave the
//! actual string test to a [`ValueFilter`]. [`StringFilter`] is the regex based
//! implementation used by default.
//!
//! ## Grammar
//!
//! ```text
//! <filter>   := "All()" | ("+" | "-") <patterns> | <rule> "{" [<filter> ("," <filter>)*] "}"
//! <patterns> := <quoted> ("," <quoted>)*
//! <quoted>   := "'" (any char except "'" | "''")* "'"
//! <rule>     := "and" | "or" | "first" | "last" | "tree" | "none"
//! ```
//!
//! `+` lists are whitelists (accept a value matching any pattern), `-` lists are
//! blacklists (accept a value matching none). Patterns are regular expressions
//! searched anywhere in the value.
//!
//! ## Examples
//!
//! ```text
//! +'^nt:file$'                 # exactly nt:file
//! -'^rep:','^oak:'             # anything outside the rep: and oak: namespaces
//! and{+'^image/',-'svg'}       # images except SVG
//! ```

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, delimited, fail, opt, peek, separated};
use winnow::error::{ErrMode, ParserError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};
use winnow::ModalResult;

use crate::error::DecodeError;
use crate::rule::Rule;

/// A test over single string values.
///
/// Resource predicates are generic over this trait so the regex based
/// [`StringFilter`] can be replaced, for example by a stub in tests.
pub trait ValueFilter {
    /// Returns true if the value matches.
    fn accept(&self, value: &str) -> bool;

    /// Returns true if the filter primarily excludes values (a blacklist).
    fn is_restriction(&self) -> bool;

    /// Append the filter's canonical text.
    fn encode(&self, out: &mut String);

    /// Rebuild a filter from the text written by [`ValueFilter::encode`].
    fn decode(text: &str) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

/// A non-empty list of compiled patterns.
#[derive(Debug, Clone)]
pub struct Patterns {
    regexes: Vec<Regex>,
}

impl Patterns {
    fn compile<I, S>(filter: &str, patterns: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regexes = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| DecodeError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if regexes.is_empty() {
            return Err(DecodeError::EmptyPatternList {
                filter: filter.to_string(),
            });
        }
        Ok(Patterns { regexes })
    }

    /// Returns true if any pattern is found in `value`.
    pub fn matches(&self, value: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(value))
    }

    /// The source text of each pattern.
    pub fn as_strs(&self) -> impl Iterator<Item = &str> {
        self.regexes.iter().map(Regex::as_str)
    }

    fn encode(&self, sign: char, out: &mut String) {
        out.push(sign);
        for (i, pattern) in self.as_strs().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('\'');
            out.push_str(&pattern.replace('\'', "''"));
            out.push('\'');
        }
    }
}

/// Regex based string filter.
#[derive(Debug, Clone)]
pub enum StringFilter {
    /// Accepts every value.
    All,
    /// Accepts values matching any of the patterns.
    WhiteList(Patterns),
    /// Accepts values matching none of the patterns.
    BlackList(Patterns),
    /// Combines filters under a rule.
    Set {
        rule: Rule,
        filters: Vec<StringFilter>,
    },
}

impl StringFilter {
    /// Build a whitelist from regex patterns.
    pub fn whitelist<I, S>(patterns: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Patterns::compile("+", patterns).map(StringFilter::WhiteList)
    }

    /// Build a blacklist from regex patterns.
    pub fn blacklist<I, S>(patterns: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Patterns::compile("-", patterns).map(StringFilter::BlackList)
    }

    /// Combine filters under `rule`.
    pub fn set(rule: Rule, filters: Vec<StringFilter>) -> Self {
        StringFilter::Set { rule, filters }
    }

    /// Parse a string filter from its canonical text.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DecodeError::Empty);
        }
        (|input: &mut &str| parse_string_filter(input, 0))
            .parse(text)
            .map_err(|e| DecodeError::from_parse_error(text, &e))
    }
}

impl ValueFilter for StringFilter {
    fn accept(&self, value: &str) -> bool {
        match self {
            StringFilter::All => true,
            StringFilter::WhiteList(patterns) => patterns.matches(value),
            StringFilter::BlackList(patterns) => !patterns.matches(value),
            StringFilter::Set { rule, filters } => {
                rule.combine(filters, |f| f.accept(value), |f| f.is_restriction())
            }
        }
    }

    fn is_restriction(&self) -> bool {
        match self {
            StringFilter::All | StringFilter::WhiteList(_) => false,
            StringFilter::BlackList(_) => true,
            StringFilter::Set { rule, filters } => rule.restriction(filters, |f| f.is_restriction()),
        }
    }

    fn encode(&self, out: &mut String) {
        match self {
            StringFilter::All => out.push_str("All()"),
            StringFilter::WhiteList(patterns) => patterns.encode('+', out),
            StringFilter::BlackList(patterns) => patterns.encode('-', out),
            StringFilter::Set { rule, filters } => {
                out.push_str(rule.name());
                out.push('{');
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    filter.encode(out);
                }
                out.push('}');
            }
        }
    }

    fn decode(text: &str) -> Result<Self, DecodeError> {
        StringFilter::parse(text)
    }
}

impl fmt::Display for StringFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.encode(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for StringFilter {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StringFilter::parse(s)
    }
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

/// Deepest nesting of rule sets the parsers accept.
pub(crate) const MAX_NESTING: usize = 64;

/// Fail with a cut error once `depth` enclosing sets reach [`MAX_NESTING`].
pub(crate) fn check_nesting(input: &mut &str, depth: usize) -> ModalResult<()> {
    if depth < MAX_NESTING {
        return Ok(());
    }
    cut_err(fail::<_, (), _>)
        .context(StrContext::Label("filter set"))
        .context(StrContext::Expected(StrContextValue::Description(
            "at most 64 nested sets",
        )))
        .parse_next(input)
}

fn parse_string_filter(input: &mut &str, depth: usize) -> ModalResult<StringFilter> {
    let _ = multispace0.parse_next(input)?;
    let filter = alt((
        parse_pattern_list,
        parse_all,
        |input: &mut &str| parse_set(input, depth),
    ))
    .context(StrContext::Label("string filter"))
    .parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(filter)
}

/// Parse `All()`.
fn parse_all(input: &mut &str) -> ModalResult<StringFilter> {
    ("All", multispace0, '(', multispace0, ')')
        .value(StringFilter::All)
        .parse_next(input)
}

/// Parse a signed pattern list; the sign commits to this branch.
fn parse_pattern_list(input: &mut &str) -> ModalResult<StringFilter> {
    let sign = one_of(['+', '-']).parse_next(input)?;
    cut_err(parse_patterns.try_map(move |patterns| match sign {
        '+' => StringFilter::whitelist(patterns),
        _ => StringFilter::blacklist(patterns),
    }))
    .parse_next(input)
}

fn parse_patterns(input: &mut &str) -> ModalResult<Vec<String>> {
    let mut patterns = vec![parse_quoted(input)?];
    // A comma continues the list only when another quoted pattern follows;
    // otherwise it separates the next filter of an enclosing set.
    while opt((multispace0, ',', multispace0, peek('\'')))
        .parse_next(input)?
        .is_some()
    {
        patterns.push(parse_quoted(input)?);
    }
    Ok(patterns)
}

/// Parse a single-quoted literal where `''` stands for one quote.
pub(crate) fn parse_quoted(input: &mut &str) -> ModalResult<String> {
    let _ = '\''
        .context(StrContext::Expected(StrContextValue::CharLiteral('\'')))
        .parse_next(input)?;
    let mut value = String::new();
    loop {
        let chunk: &str = take_till(0.., '\'').parse_next(input)?;
        value.push_str(chunk);
        let _ = cut_err('\'')
            .context(StrContext::Label("quoted pattern"))
            .context(StrContext::Expected(StrContextValue::CharLiteral('\'')))
            .parse_next(input)?;
        if opt('\'').parse_next(input)?.is_none() {
            break;
        }
        value.push('\'');
    }
    Ok(value)
}

/// Parse `rule{filter,...}`.
fn parse_set(input: &mut &str, depth: usize) -> ModalResult<StringFilter> {
    let checkpoint = *input;
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let Some(rule) = Rule::parse(name) else {
        *input = checkpoint;
        return Err(ErrMode::from_input(input));
    };
    check_nesting(input, depth)?;

    let filters: Vec<StringFilter> = cut_err(delimited(
        ('{', multispace0),
        separated(
            0..,
            |input: &mut &str| parse_string_filter(input, depth + 1),
            (multispace0, ',', multispace0),
        ),
        (multispace0, '}'),
    ))
    .context(StrContext::Label("filter set"))
    .parse_next(input)?;

    Ok(StringFilter::Set { rule, filters })
}
