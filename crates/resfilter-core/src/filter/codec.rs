//! Text encoding of resource filters.
//!
//! Every filter has a canonical single-line text form. `decode` is the inverse of
//! `encode`: decoding an encoded filter yields a filter that accepts the same
//! resources and reports the same restriction polarity.
//!
//! ## Grammar
//!
//! ```text
//! <filter>   := <leaf> | <rule> "{" [<filter> ("," <filter>)*] "}"
//! <leaf>     := "All()" | "Folder()" | "Type(" <types> ")"
//!             | ("Name" | "Path" | "PrimaryType" | "MixinType"
//!                | "ResourceType" | "MimeType") "(" <value filter> ")"
//! <types>    := ["+" | "-"] "[" [type ("," type)*] "]" | type ("," type)*
//! <rule>     := "and" | "or" | "first" | "last" | "tree" | "none"
//! ```
//!
//! `<value filter>` is the text of the [`ValueFilter`] in use and is decoded by
//! it. The argument of a leaf runs to the matching `)`; brackets must balance
//! and single-quoted literals are skipped.
//!
//! ## Examples
//!
//! ```text
//! Folder()
//! Type(-[nt:folder,sling:Folder])
//! and{PrimaryType(+'^nt:file$'),MimeType(+'^image/')}
//! tree{Name(+'\.json$'),Folder()}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, delimited, preceded, separated, terminated};
use winnow::error::{ErrMode, ParserError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use super::predicate::{ResourceFilter, TypeFilter};
use super::set::FilterSet;
use crate::error::DecodeError;
use crate::rule::Rule;
use crate::string_filter::{check_nesting, parse_quoted, ValueFilter};

/// Decode a filter from its text form.
///
/// # Examples
///
/// ```
/// use resfilter_core::filter::{decode, ResourceFilter};
///
/// let filter: ResourceFilter = decode("or{Folder(),Name(+'\\.txt$')}").unwrap();
/// assert_eq!(filter.to_string(), "or{Folder(),Name(+'\\.txt$')}");
/// ```
pub fn decode<F: ValueFilter>(text: &str) -> Result<ResourceFilter<F>, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    (|input: &mut &str| parse_filter::<F>(input, 0))
        .parse(text)
        .map_err(|e| {
            let err = DecodeError::from_parse_error(text, &e);
            debug!(input = text, error = %err, "failed to decode filter");
            err
        })
}

/// Encode a filter into its canonical text form.
pub fn encode<F: ValueFilter>(filter: &ResourceFilter<F>) -> String {
    let mut out = String::new();
    filter.encode(&mut out);
    out
}

/// Leaf predicate kinds, by grammar name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafKind {
    All,
    Folder,
    Type,
    Name,
    Path,
    PrimaryType,
    MixinType,
    ResourceType,
    MimeType,
}

impl LeafKind {
    const ALL: [LeafKind; 9] = [
        LeafKind::All,
        LeafKind::Folder,
        LeafKind::Type,
        LeafKind::Name,
        LeafKind::Path,
        LeafKind::PrimaryType,
        LeafKind::MixinType,
        LeafKind::ResourceType,
        LeafKind::MimeType,
    ];

    fn name(&self) -> &'static str {
        match self {
            LeafKind::All => "All",
            LeafKind::Folder => "Folder",
            LeafKind::Type => "Type",
            LeafKind::Name => "Name",
            LeafKind::Path => "Path",
            LeafKind::PrimaryType => "PrimaryType",
            LeafKind::MixinType => "MixinType",
            LeafKind::ResourceType => "ResourceType",
            LeafKind::MimeType => "MimeType",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        LeafKind::ALL.into_iter().find(|kind| kind.name() == s)
    }

    /// Build the predicate from the text between the parentheses.
    fn build<F: ValueFilter>(self, argument: &str) -> Result<ResourceFilter<F>, DecodeError> {
        match self {
            LeafKind::All => Ok(ResourceFilter::All),
            LeafKind::Folder => Ok(ResourceFilter::Folder),
            LeafKind::Type => TypeFilter::parse(argument).map(ResourceFilter::Type),
            LeafKind::Name => F::decode(argument).map(ResourceFilter::Name),
            LeafKind::Path => F::decode(argument).map(ResourceFilter::Path),
            LeafKind::PrimaryType => F::decode(argument).map(ResourceFilter::PrimaryType),
            LeafKind::MixinType => F::decode(argument).map(ResourceFilter::MixinType),
            LeafKind::ResourceType => F::decode(argument).map(ResourceFilter::ResourceType),
            LeafKind::MimeType => F::decode(argument).map(ResourceFilter::MimeType),
        }
    }
}

/// What a name at the head of a filter introduces.
#[derive(Debug, Clone, Copy)]
enum Head {
    Leaf(LeafKind),
    Set(Rule),
}

impl Head {
    fn parse(name: &str) -> Option<Self> {
        LeafKind::parse(name)
            .map(Head::Leaf)
            .or_else(|| Rule::parse(name).map(Head::Set))
    }
}

// ============================================================================
// Encoding
// ============================================================================

impl<F: ValueFilter> ResourceFilter<F> {
    /// Append the filter's canonical text.
    pub fn encode(&self, out: &mut String) {
        match self {
            ResourceFilter::All => encode_leaf(LeafKind::All, out, |_| {}),
            ResourceFilter::Folder => encode_leaf(LeafKind::Folder, out, |_| {}),
            ResourceFilter::Type(filter) => {
                encode_leaf(LeafKind::Type, out, |out| filter.encode_type_names(out))
            }
            ResourceFilter::Name(filter) => {
                encode_leaf(LeafKind::Name, out, |out| filter.encode(out))
            }
            ResourceFilter::Path(filter) => {
                encode_leaf(LeafKind::Path, out, |out| filter.encode(out))
            }
            ResourceFilter::PrimaryType(filter) => {
                encode_leaf(LeafKind::PrimaryType, out, |out| filter.encode(out))
            }
            ResourceFilter::MixinType(filter) => {
                encode_leaf(LeafKind::MixinType, out, |out| filter.encode(out))
            }
            ResourceFilter::ResourceType(filter) => {
                encode_leaf(LeafKind::ResourceType, out, |out| filter.encode(out))
            }
            ResourceFilter::MimeType(filter) => {
                encode_leaf(LeafKind::MimeType, out, |out| filter.encode(out))
            }
            ResourceFilter::Set(set) => set.encode(out),
        }
    }

    /// The canonical text of the filter.
    pub fn to_text(&self) -> String {
        encode(self)
    }
}

fn encode_leaf(kind: LeafKind, out: &mut String, argument: impl FnOnce(&mut String)) {
    out.push_str(kind.name());
    out.push('(');
    argument(out);
    out.push(')');
}

impl<F: ValueFilter> FilterSet<F> {
    /// Append the set's canonical text: `rule{filter,...}`.
    pub fn encode(&self, out: &mut String) {
        out.push_str(self.rule().name());
        out.push('{');
        for (i, filter) in self.filters().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            filter.encode(out);
        }
        out.push('}');
    }
}

impl<F: ValueFilter> fmt::Display for ResourceFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl<F: ValueFilter> fmt::Display for FilterSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.encode(&mut out);
        f.write_str(&out)
    }
}

impl<F: ValueFilter> FromStr for ResourceFilter<F> {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Filters serialize as their canonical text.
impl<F: ValueFilter> Serialize for ResourceFilter<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de, F: ValueFilter> Deserialize<'de> for ResourceFilter<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(D::Error::custom)
    }
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

/// Parse one filter, a leaf or a set, below `depth` enclosing sets.
fn parse_filter<F: ValueFilter>(input: &mut &str, depth: usize) -> ModalResult<ResourceFilter<F>> {
    let _ = multispace0.parse_next(input)?;

    let head = cut_err(take_while(1.., |c: char| c.is_ascii_alphanumeric()).verify_map(Head::parse))
        .context(StrContext::Label("filter name"))
        .context(StrContext::Expected(StrContextValue::Description(
            "All, Folder, Type, Name, Path, PrimaryType, MixinType, ResourceType, MimeType \
             or one of the rules and, or, first, last, tree, none",
        )))
        .parse_next(input)?;

    let filter = match head {
        Head::Leaf(kind @ (LeafKind::All | LeafKind::Folder)) => {
            let _ = cut_err((multispace0, '(', multispace0, ')'))
                .context(StrContext::Label("filter argument"))
                .context(StrContext::Expected(StrContextValue::Description(
                    "no argument",
                )))
                .parse_next(input)?;
            match kind {
                LeafKind::All => ResourceFilter::All,
                _ => ResourceFilter::Folder,
            }
        }
        Head::Leaf(kind) => cut_err(delimited(
            (multispace0, '('),
            parse_argument.try_map(move |argument| kind.build::<F>(argument)),
            ')',
        ))
        .context(StrContext::Label("filter argument"))
        .parse_next(input)?,
        Head::Set(rule) => {
            check_nesting(input, depth)?;
            let filters: Vec<ResourceFilter<F>> = cut_err(preceded(
                (multispace0, '{', multispace0),
                alt((
                    '}'.map(|_| Vec::new()),
                    terminated(
                        separated(
                            1..,
                            |input: &mut &str| parse_filter::<F>(input, depth + 1),
                            ',',
                        ),
                        '}',
                    ),
                )),
            ))
            .context(StrContext::Label("filter set"))
            .parse_next(input)?;
            ResourceFilter::Set(FilterSet::new(rule, filters))
        }
    };

    let _ = multispace0.parse_next(input)?;
    Ok(filter)
}

/// Take the argument of a leaf, up to (not including) its closing `)`.
///
/// Nested `()`, `[]` and `{}` must balance; single-quoted literals are taken
/// whole so patterns may contain any bracket.
fn parse_argument<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let start: &'i str = *input;
    let mut open: Vec<char> = Vec::new();

    loop {
        let rest: &'i str = *input;
        if rest.starts_with('\'') {
            parse_quoted(input)?;
            continue;
        }
        let mut chars = rest.chars();
        let balanced = match chars.next() {
            None => false,
            Some(')') if open.is_empty() => break,
            Some(c @ ('(' | '[' | '{')) => {
                open.push(c);
                true
            }
            Some(c @ (')' | ']' | '}')) => open.pop().map(closing) == Some(c),
            Some(_) => true,
        };
        if !balanced {
            *input = start;
            return Err(ErrMode::from_input(input));
        }
        *input = chars.as_str();
    }

    let rest: &'i str = *input;
    Ok(&start[..start.len() - rest.len()])
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryResource;
    use crate::resource::{CONTENT_NODE, PROP_MIME_TYPE};
    use crate::string_filter::StringFilter;

    fn roundtrip(text: &str) -> String {
        let filter: ResourceFilter = decode(text).unwrap();
        filter.to_text()
    }

    #[test]
    fn test_decode_leaves() {
        assert!(matches!(decode::<StringFilter>("All()"), Ok(ResourceFilter::All)));
        assert!(matches!(decode::<StringFilter>("Folder()"), Ok(ResourceFilter::Folder)));
        assert!(matches!(
            decode::<StringFilter>("Name(+'^a$')"),
            Ok(ResourceFilter::Name(_))
        ));
        assert!(matches!(
            decode::<StringFilter>("MimeType(-'^text/')"),
            Ok(ResourceFilter::MimeType(_))
        ));
        match decode::<StringFilter>("Type(-[nt:folder,sling:Folder])").unwrap() {
            ResourceFilter::Type(filter) => {
                assert!(filter.is_restriction());
                assert_eq!(filter.type_names(), ["nt:folder", "sling:Folder"]);
            }
            other => panic!("Expected Type variant, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_forms_roundtrip() {
        for text in [
            "All()",
            "Folder()",
            "Type(+[nt:file])",
            "Type(-[nt:folder,sling:Folder])",
            "Name(+'^jcr:')",
            "Path(-'^/tmp/','^/var/')",
            "PrimaryType(and{+'^nt:',-'^nt:base$'})",
            "MixinType(-'^rep:')",
            "ResourceType(+'^app/components/')",
            "MimeType(+'^image/')",
            "and{}",
            "tree{Type(+[nt:file]),Folder()}",
            "first{Name(-'^\\.'),or{Folder(),none{Path(+'^/apps')}}}",
        ] {
            assert_eq!(roundtrip(text), text);
        }
    }

    #[test]
    fn test_decode_normalizes_whitespace_and_type_lists() {
        assert_eq!(roundtrip("  and{ Folder() , Name( +'a' ) }  "), "and{Folder(),Name(+'a')}");
        assert_eq!(roundtrip("Type(nt:file, nt:folder)"), "Type(+[nt:file,nt:folder])");
        assert_eq!(roundtrip("Type([nt:file])"), "Type(+[nt:file])");
    }

    #[test]
    fn test_patterns_with_brackets() {
        let text = "Name(+'^(a|b)\\)[x{]$','it''s')";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_scenario_and_of_primary_and_mime_type() {
        let filter = ResourceFilter::Set(FilterSet::new(
            Rule::And,
            vec![
                ResourceFilter::PrimaryType(StringFilter::whitelist(["nt:file"]).unwrap()),
                ResourceFilter::MimeType(StringFilter::whitelist(["image/*"]).unwrap()),
            ],
        ));
        let text = encode(&filter);
        assert_eq!(text, "and{PrimaryType(+'nt:file'),MimeType(+'image/*')}");

        let decoded: ResourceFilter = decode(&text).unwrap();
        let image = MemoryResource::new("logo.png")
            .with_primary_type("nt:file")
            .with_child(MemoryResource::new(CONTENT_NODE).with_property(PROP_MIME_TYPE, "image/png"));
        let doc = MemoryResource::new("a.txt")
            .with_primary_type("nt:file")
            .with_property(PROP_MIME_TYPE, "text/plain");
        assert!(decoded.accept(Some(&image)));
        assert!(!decoded.accept(Some(&doc)));
    }

    #[test]
    fn test_decode_errors() {
        let cases = [
            "Bogus()",
            "All(x)",
            "Folder",
            "Name(+'a'",
            "and{Folder()",
            "and(Folder())",
            "Name{+'a'}",
            "or{Folder(),}",
            "Type(+[a)",
            "Folder() trailing",
            "Name(+'unterminated)",
        ];
        for text in cases {
            let result = decode::<StringFilter>(text);
            assert!(result.is_err(), "expected error for {}", text);
        }
    }

    #[test]
    fn test_decode_error_names_fragment() {
        match decode::<StringFilter>("and{Folder(),Bogus()}") {
            Err(DecodeError::Syntax {
                fragment, offset, ..
            }) => {
                assert_eq!(offset, 13);
                assert!(fragment.starts_with("Bogus()"));
            }
            other => panic!("Expected Syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_argument_error_offset_is_in_whole_input() {
        match decode::<StringFilter>("and{Folder(),All(x)}") {
            Err(DecodeError::Syntax {
                fragment, offset, ..
            }) => {
                assert_eq!(offset, 17);
                assert!(fragment.starts_with("x)"));
            }
            other => panic!("Expected Syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_nesting_limit() {
        use crate::string_filter::MAX_NESTING;

        let nested = |depth: usize| format!("{}Folder(){}", "or{".repeat(depth), "}".repeat(depth));

        assert!(decode::<StringFilter>(&nested(MAX_NESTING)).is_ok());
        match decode::<StringFilter>(&nested(10_000)) {
            Err(DecodeError::Syntax { message, .. }) => assert!(message.contains("nested")),
            other => panic!("Expected Syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_nested_errors_pass_through() {
        assert!(matches!(
            decode::<StringFilter>("Name(+'(bad')"),
            Err(DecodeError::InvalidPattern { .. })
        ));
        assert!(matches!(
            decode::<StringFilter>("Type(+nt:file)"),
            Err(DecodeError::MalformedTypeList { .. })
        ));
        assert!(matches!(decode::<StringFilter>("  "), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_serde_as_text() {
        let filter: ResourceFilter = decode("or{Folder(),Name(+'a')}").unwrap();
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, "\"or{Folder(),Name(+'a')}\"");

        let back: ResourceFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_text(), filter.to_text());

        let bad: Result<ResourceFilter, _> = serde_json::from_str("\"Nope()\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_from_str_and_display() {
        let filter: ResourceFilter = "Type(+[nt:file])".parse().unwrap();
        assert_eq!(format!("{}", filter), "Type(+[nt:file])");
        match filter {
            ResourceFilter::Type(_) => {}
            other => panic!("Expected Type variant, got {:?}", other),
        }
    }
}
