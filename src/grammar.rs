//! Field-type grammar parser.
//!
//! Field types in a model entry are compact strings:
//!
//! ```text
//! BASE [ '(' arg ')' ] [ '!' ] [ '[]' ]
//! ```
//!
//! `!` marks the field required, `[]` marks it multivalued, and the
//! parenthetical argument names a taxonomy vocabulary, paragraph bundle, or
//! generic reference target. Examples:
//!
//! ```text
//! string                  single optional text field
//! integer![]              required multivalued integer
//! taxonomy(topics)        reference into the "topics" vocabulary
//! paragraph(event_detail)[]  multivalued paragraph reference
//! reference(node.event)   generic reference to node.event entities
//! ```
//!
//! A parse failure is scoped to the one field: the schema planner records a
//! warning and the owning bundle still proceeds.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, char},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::storage::EntityKind;

/// Base kind of a field, after grammar parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    LongText,
    RichText,
    Integer,
    Decimal,
    Boolean,
    Email,
    Phone,
    Link,
    Image,
    File,
    DateTime,
    DateRange,
    TaxonomyReference { vocabulary: String },
    ParagraphReference { bundle: String },
    GenericReference { kind: EntityKind, bundle: String },
}

impl FieldKind {
    /// Reference kinds take `@id` tokens and are written in pass 2.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldKind::TaxonomyReference { .. }
                | FieldKind::ParagraphReference { .. }
                | FieldKind::GenericReference { .. }
        )
    }
}

/// A fully parsed field type: base kind plus cardinality/requirement flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFieldType {
    pub kind: FieldKind,
    pub required: bool,
    pub multivalued: bool,
}

impl ParsedFieldType {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            multivalued: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multivalued(mut self) -> Self {
        self.multivalued = true;
        self
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a compact field-type string into a `ParsedFieldType`.
pub fn parse_field_type(input: &str) -> Result<ParsedFieldType, GrammarError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GrammarError::Malformed(input.to_string()));
    }

    let (rest, raw) =
        type_expr(trimmed).map_err(|_: nom::Err<nom::error::Error<&str>>| {
            GrammarError::Malformed(input.to_string())
        })?;
    if !rest.is_empty() {
        return Err(GrammarError::Malformed(input.to_string()));
    }

    let kind = resolve_kind(raw.base, raw.arg)?;
    Ok(ParsedFieldType {
        kind,
        required: raw.required,
        multivalued: raw.multivalued,
    })
}

// ============================================================================
// Internal Parsers
// ============================================================================

struct RawType<'a> {
    base: &'a str,
    arg: Option<&'a str>,
    required: bool,
    multivalued: bool,
}

fn type_expr(input: &str) -> IResult<&str, RawType<'_>> {
    let (input, base) = base_token(input)?;
    let (input, arg) = opt(paren_arg)(input)?;
    let (input, required) = opt(char('!'))(input)?;
    let (input, multivalued) = opt(tag("[]"))(input)?;
    Ok((
        input,
        RawType {
            base,
            arg,
            required: required.is_some(),
            multivalued: multivalued.is_some(),
        },
    ))
}

/// Base token: lowercase identifier, underscores allowed.
fn base_token(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_"))))))(input)
}

/// Parenthetical argument: anything up to the closing paren.
fn paren_arg(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while1(|c| c != '(' && c != ')'), char(')'))(input)
}

// ============================================================================
// Base Token Resolution
// ============================================================================

fn scalar_kind(base: &str) -> Option<FieldKind> {
    match base {
        "string" => Some(FieldKind::Text),
        "text" => Some(FieldKind::LongText),
        "rich_text" => Some(FieldKind::RichText),
        "integer" => Some(FieldKind::Integer),
        "decimal" => Some(FieldKind::Decimal),
        "boolean" => Some(FieldKind::Boolean),
        "email" => Some(FieldKind::Email),
        "telephone" => Some(FieldKind::Phone),
        "link" => Some(FieldKind::Link),
        "image" => Some(FieldKind::Image),
        "file" => Some(FieldKind::File),
        "datetime" => Some(FieldKind::DateTime),
        "daterange" => Some(FieldKind::DateRange),
        _ => None,
    }
}

fn resolve_kind(base: &str, arg: Option<&str>) -> Result<FieldKind, GrammarError> {
    if let Some(kind) = scalar_kind(base) {
        return match arg {
            None => Ok(kind),
            Some(_) => Err(GrammarError::UnexpectedArgument {
                base: base.to_string(),
            }),
        };
    }

    match base {
        "taxonomy" => match arg {
            Some(vocabulary) => Ok(FieldKind::TaxonomyReference {
                vocabulary: vocabulary.to_string(),
            }),
            None => Err(GrammarError::MissingArgument {
                base: base.to_string(),
            }),
        },
        "paragraph" => match arg {
            Some(bundle) => Ok(FieldKind::ParagraphReference {
                bundle: bundle.to_string(),
            }),
            None => Err(GrammarError::MissingArgument {
                base: base.to_string(),
            }),
        },
        "reference" => match arg {
            Some(target) => parse_reference_target(target),
            None => Err(GrammarError::MissingArgument {
                base: base.to_string(),
            }),
        },
        _ => Err(GrammarError::UnknownBase(base.to_string())),
    }
}

/// A generic reference target is `kind.bundle`, mirroring the `type` key of
/// content entries.
fn parse_reference_target(target: &str) -> Result<FieldKind, GrammarError> {
    let (kind, bundle) = target
        .split_once('.')
        .ok_or_else(|| GrammarError::BadReferenceTarget(target.to_string()))?;
    let kind = EntityKind::parse(kind)
        .ok_or_else(|| GrammarError::BadReferenceTarget(target.to_string()))?;
    if bundle.is_empty() {
        return Err(GrammarError::BadReferenceTarget(target.to_string()));
    }
    Ok(FieldKind::GenericReference {
        kind,
        bundle: bundle.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_scalar() {
        let parsed = parse_field_type("string").unwrap();
        assert_eq!(parsed.kind, FieldKind::Text);
        assert!(!parsed.required);
        assert!(!parsed.multivalued);
    }

    #[test]
    fn test_required_and_multivalued_suffixes() {
        let parsed = parse_field_type("integer![]").unwrap();
        assert_eq!(parsed.kind, FieldKind::Integer);
        assert!(parsed.required);
        assert!(parsed.multivalued);

        let required_only = parse_field_type("boolean!").unwrap();
        assert!(required_only.required);
        assert!(!required_only.multivalued);

        let multi_only = parse_field_type("datetime[]").unwrap();
        assert!(!multi_only.required);
        assert!(multi_only.multivalued);
    }

    #[test]
    fn test_taxonomy_with_vocabulary() {
        let parsed = parse_field_type("taxonomy(topics)").unwrap();
        assert_eq!(
            parsed.kind,
            FieldKind::TaxonomyReference {
                vocabulary: "topics".to_string()
            }
        );
        assert!(parsed.kind.is_reference());
    }

    #[test]
    fn test_paragraph_reference_multivalued() {
        let parsed = parse_field_type("paragraph(event_detail)[]").unwrap();
        assert_eq!(
            parsed.kind,
            FieldKind::ParagraphReference {
                bundle: "event_detail".to_string()
            }
        );
        assert!(parsed.multivalued);
    }

    #[test]
    fn test_generic_reference_target() {
        let parsed = parse_field_type("reference(node.event)").unwrap();
        assert_eq!(
            parsed.kind,
            FieldKind::GenericReference {
                kind: EntityKind::Node,
                bundle: "event".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_base_token() {
        assert_eq!(
            parse_field_type("bogus_type"),
            Err(GrammarError::UnknownBase("bogus_type".to_string()))
        );
    }

    #[test]
    fn test_malformed_parens() {
        assert!(matches!(
            parse_field_type("taxonomy(topics"),
            Err(GrammarError::Malformed(_))
        ));
        assert!(matches!(
            parse_field_type("taxonomy()"),
            Err(GrammarError::Malformed(_))
        ));
    }

    #[test]
    fn test_argument_arity() {
        assert_eq!(
            parse_field_type("string(nope)"),
            Err(GrammarError::UnexpectedArgument {
                base: "string".to_string()
            })
        );
        assert_eq!(
            parse_field_type("taxonomy"),
            Err(GrammarError::MissingArgument {
                base: "taxonomy".to_string()
            })
        );
    }

    #[test]
    fn test_bad_reference_target() {
        assert!(matches!(
            parse_field_type("reference(event)"),
            Err(GrammarError::BadReferenceTarget(_))
        ));
        assert!(matches!(
            parse_field_type("reference(block.event)"),
            Err(GrammarError::BadReferenceTarget(_))
        ));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(
            parse_field_type("string!x"),
            Err(GrammarError::Malformed(_))
        ));
        assert!(matches!(
            parse_field_type("string[]!"),
            Err(GrammarError::Malformed(_))
        ));
    }
}
