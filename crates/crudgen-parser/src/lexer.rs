//! Lexer/tokenizer for class-diagram text.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit1, space0, space1, satisfy},
    combinator::{all_consuming, map, map_res, not, opt, peek, recognize, rest, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crudgen_core::ast::{Arrow, RawModifier, RawType};

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse an identifier (starts with letter/underscore, followed by alphanumeric/underscore).
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_ident_start), take_while(is_ident_char)))(input)
}

/// A keyword followed by a word boundary.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(peek(satisfy(is_ident_char))))
}

/// Parse a signed integer.
pub fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>)(input)
}

/// Parse a `"quoted"` multiplicity and return its trimmed contents.
pub fn quoted(input: &str) -> IResult<&str, &str> {
    map(delimited(char('"'), take_until("\""), char('"')), str::trim)(input)
}

/// Parse a `<<stereotype>>` annotation and return its trimmed contents.
pub fn stereotype(input: &str) -> IResult<&str, &str> {
    map(delimited(tag("<<"), take_until(">>"), tag(">>")), str::trim)(input)
}

/// Parse a generic parameter list `~T~`.
fn generic_params(input: &str) -> IResult<&str, &str> {
    delimited(char('~'), take_until("~"), char('~'))(input)
}

/// Parse a field type: `Name`, `List~T~`, `List<T>` or `T[]`.
pub fn type_ref(input: &str) -> IResult<&str, RawType> {
    let (input, name) = identifier(input)?;
    let (input, element) = opt(alt((
        delimited(char('~'), identifier, char('~')),
        delimited(char('<'), identifier, char('>')),
    )))(input)?;
    if let Some(element) = element {
        return Ok((
            input,
            RawType::Collection {
                container: name.to_string(),
                element: element.to_string(),
            },
        ));
    }
    let (input, array) = opt(tag("[]"))(input)?;
    let ty = match array {
        Some(_) => RawType::Collection {
            container: "List".to_string(),
            element: name.to_string(),
        },
        None => RawType::Named(name.to_string()),
    };
    Ok((input, ty))
}

fn bound(input: &str) -> IResult<&str, i64> {
    alt((
        preceded(tuple((space0, char('='), space0)), integer),
        delimited(pair(char('('), space0), integer, pair(space0, char(')'))),
    ))(input)
}

/// Parse one field modifier.
pub fn modifier(input: &str) -> IResult<&str, RawModifier> {
    alt((
        value(
            RawModifier::PrimaryKey,
            alt((keyword("primary_key"), keyword("primary"), keyword("pk"))),
        ),
        value(
            RawModifier::NotNull,
            alt((
                keyword("not_null"),
                keyword("notnull"),
                recognize(tuple((tag_no_case("not"), space1, keyword("null")))),
                keyword("required"),
            )),
        ),
        value(RawModifier::Unique, keyword("unique")),
        map(preceded(tag_no_case("min"), bound), RawModifier::Min),
        map(preceded(tag_no_case("max"), bound), RawModifier::Max),
    ))(input)
}

/// Parse the modifier tail of a field line. Must consume the whole input.
fn modifiers(input: &str) -> IResult<&str, Vec<RawModifier>> {
    terminated(many0(preceded(space1, modifier)), space0)(input)
}

/// A field line in either accepted order, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParts<'a> {
    pub name: &'a str,
    pub type_ref: RawType,
    pub modifiers: Vec<RawModifier>,
}

/// `name: Type modifiers*`
pub fn field_name_colon_type(input: &str) -> IResult<&str, FieldParts<'_>> {
    map(
        all_consuming(tuple((
            identifier,
            space0,
            char(':'),
            space0,
            type_ref,
            modifiers,
        ))),
        |(name, _, _, _, type_ref, modifiers)| FieldParts {
            name,
            type_ref,
            modifiers,
        },
    )(input)
}

/// `Type name modifiers*`
pub fn field_type_then_name(input: &str) -> IResult<&str, FieldParts<'_>> {
    map(
        all_consuming(tuple((type_ref, space1, identifier, modifiers))),
        |(type_ref, _, name, modifiers)| FieldParts {
            name,
            type_ref,
            modifiers,
        },
    )(input)
}

/// Parse a relationship arrow. Longer arrows are tried first.
pub fn arrow(input: &str) -> IResult<&str, Arrow> {
    alt((
        value(Arrow::OneToMany, tag("||--o{")),
        value(Arrow::ManyToOne, tag("}o--||")),
        value(Arrow::OneToOne, tag("||--||")),
        value(Arrow::ManyToMany, tag("}o--o{")),
        value(Arrow::Association, tag("-->")),
        value(Arrow::ReverseAssociation, tag("<--")),
        value(Arrow::Dependency, tag("..>")),
        value(Arrow::Composition, tag("*--")),
        value(Arrow::Aggregation, tag("o--")),
        value(
            Arrow::ReverseComposition,
            terminated(tag("--*"), not(peek(satisfy(is_ident_char)))),
        ),
        value(
            Arrow::ReverseAggregation,
            terminated(tag("--o"), not(peek(satisfy(is_ident_char)))),
        ),
        value(Arrow::Link, tag("--")),
        value(Arrow::DashedLink, tag("..")),
    ))(input)
}

/// Inheritance arrows as `(parent on the left, dotted)`.
fn inheritance_arrow(input: &str) -> IResult<&str, (bool, bool)> {
    alt((
        value((true, false), tag("<|--")),
        value((true, true), tag("<|..")),
        value((false, false), tag("--|>")),
        value((false, true), tag("..|>")),
    ))(input)
}

/// An inheritance or realization line, oriented parent first.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceParts<'a> {
    pub parent: &'a str,
    pub child: &'a str,
    pub realization: bool,
}

/// `Parent <|-- Child`, `Child --|> Parent`, or the dotted `<|..` / `..|>`
/// realization forms. A trailing `: label` is accepted and dropped.
pub fn inheritance(input: &str) -> IResult<&str, InheritanceParts<'_>> {
    map(
        all_consuming(tuple((
            terminated(identifier, space0),
            terminated(inheritance_arrow, space0),
            terminated(identifier, space0),
            opt(preceded(char(':'), rest)),
        ))),
        |(left, (parent_left, realization), right, _)| {
            let (parent, child) = if parent_left { (left, right) } else { (right, left) };
            InheritanceParts {
                parent,
                child,
                realization,
            }
        },
    )(input)
}

/// Whether a line contains something that looks like a relationship arrow
/// outside of quoted multiplicities.
pub fn looks_like_relationship(line: &str) -> bool {
    let mut unquoted = String::with_capacity(line.len());
    let mut in_quotes = false;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            unquoted.push(c);
        }
    }
    let head = unquoted.split(':').next().unwrap_or_default();
    head.contains("--") || head.contains("..")
}

/// A relationship line split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipParts<'a> {
    pub source: &'a str,
    pub source_multiplicity: Option<&'a str>,
    pub arrow: Arrow,
    pub target_multiplicity: Option<&'a str>,
    pub target: &'a str,
    pub label: Option<&'a str>,
}

/// `A ["m"] ARROW ["m"] B [: label]`
pub fn relationship(input: &str) -> IResult<&str, RelationshipParts<'_>> {
    map(
        all_consuming(tuple((
            terminated(identifier, space0),
            opt(terminated(quoted, space0)),
            terminated(arrow, space0),
            opt(terminated(quoted, space0)),
            terminated(identifier, space0),
            opt(preceded(pair(char(':'), space0), rest)),
        ))),
        |(source, source_multiplicity, arrow, target_multiplicity, target, label)| {
            RelationshipParts {
                source,
                source_multiplicity,
                arrow,
                target_multiplicity,
                target,
                label: label.map(str::trim).filter(|l| !l.is_empty()),
            }
        },
    )(input)
}

/// Header of a class block.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader<'a> {
    pub name: &'a str,
    pub stereotype: Option<&'a str>,
    /// Text after the opening `{`, when the header opens a body.
    pub body: Option<&'a str>,
}

/// `class Name[~T~][["Label"]][:::style] [<<stereo>>] [{ ...]`
pub fn class_header(input: &str) -> IResult<&str, ClassHeader<'_>> {
    map(
        all_consuming(preceded(
            pair(keyword("class"), space1),
            tuple((
                identifier,
                opt(generic_params),
                opt(delimited(tag("[\""), take_until("\"]"), tag("\"]"))),
                opt(preceded(tag(":::"), identifier)),
                space0,
                opt(terminated(stereotype, space0)),
                opt(preceded(char('{'), rest)),
            )),
        )),
        |(name, _, _, _, _, stereotype, body)| ClassHeader {
            name,
            stereotype,
            body,
        },
    )(input)
}

/// `enum Name [{ ...]`
pub fn enum_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    all_consuming(preceded(
        pair(keyword("enum"), space1),
        tuple((
            terminated(identifier, space0),
            opt(preceded(char('{'), rest)),
        )),
    ))(input)
}

/// `namespace Name {`
pub fn namespace_header(input: &str) -> IResult<&str, &str> {
    all_consuming(delimited(
        pair(keyword("namespace"), space1),
        identifier,
        tuple((space0, char('{'), space0)),
    ))(input)
}

/// `<<stereo>> Name`
pub fn stereotype_line(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(tuple((
        terminated(stereotype, space0),
        terminated(identifier, space0),
    )))(input)
}

/// `Name : member`
pub fn member_line(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(tuple((
        terminated(identifier, tuple((space0, char(':'), space0))),
        rest,
    )))(input)
}

/// A non-blank, non-comment line of input.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub content: &'a str,
    pub line_number: u32,
}

/// Split input into trimmed lines, dropping blanks and `%%` / `//` comments.
pub fn split_lines(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("%%")
                || trimmed.starts_with("//")
                || trimmed.starts_with("```")
            {
                None
            } else {
                Some(Line {
                    content: trimmed,
                    line_number: (i + 1) as u32,
                })
            }
        })
        .collect()
}
