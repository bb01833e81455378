use crate::ast::{FieldPath, Segment, Variable};
use nom::{
    branch, bytes::complete as bytes, character::complete as character, combinator, error,
    multi, sequence, IResult,
};

pub(crate) type Result<'a, T> = IResult<&'a str, T, error::VerboseError<&'a str>>;

/// Parse a full template, starting at the leading slash, into its segments
/// and custom verb.
pub(crate) fn template(input: &str) -> Result<(Vec<Segment<'_>>, Option<&str>)> {
    let (s, _) = error::context("leading slash", character::char('/'))(input)?;

    if s.is_empty() {
        return Ok((s, (vec![], None)));
    }

    let (s, mut segments) = combinator::cut(segments)(s)?;
    let (s, verb) = combinator::opt(sequence::preceded(
        character::char(':'),
        error::context("verb", combinator::cut(bytes::is_not("/{}:"))),
    ))(s)?;
    let (s, _) = error::context("segment separator", combinator::cut(combinator::eof))(s)?;

    let verb = match verb {
        Some(verb) => Some(verb),
        None => split_verb(&mut segments)?,
    };

    Ok((s, (segments, verb)))
}

// A verb following a literal is lexed as part of it, e.g. `messages:batchGet`.
fn split_verb<'a>(
    segments: &mut [Segment<'a>],
) -> std::result::Result<Option<&'a str>, nom::Err<error::VerboseError<&'a str>>> {
    let lit = match segments.last_mut() {
        Some(Segment::Literal(lit)) => lit,
        _ => return Ok(None),
    };
    let text: &'a str = *lit;

    let idx = match text.rfind(':') {
        Some(idx) => idx,
        None => return Ok(None),
    };

    let (head, verb) = (&text[..idx], &text[idx + 1..]);
    if head.is_empty() || verb.is_empty() {
        return Err(nom::Err::Failure(error::VerboseError {
            errors: vec![(&text[idx..], error::VerboseErrorKind::Context("verb"))],
        }));
    }

    *lit = head;
    Ok(Some(verb))
}

fn segments(input: &str) -> Result<Vec<Segment<'_>>> {
    multi::separated_list1(character::char('/'), segment)(input)
}

fn segment(input: &str) -> Result<Segment<'_>> {
    error::context(
        "segment",
        branch::alt((deep_wildcard, wildcard, variable, literal)),
    )(input)
}

// Variables do not nest, so a sub-pattern only accepts these.
fn inner_segment(input: &str) -> Result<Segment<'_>> {
    let not_variable = error::context(
        "nested variable",
        combinator::not(character::char('{')),
    );

    sequence::preceded(
        not_variable,
        error::context("segment", branch::alt((deep_wildcard, wildcard, literal))),
    )(input)
}

fn boundary(input: &str) -> Result<()> {
    combinator::value(
        (),
        combinator::peek(branch::alt((
            combinator::eof,
            bytes::tag("/"),
            bytes::tag("}"),
            bytes::tag(":"),
        ))),
    )(input)
}

fn deep_wildcard(input: &str) -> Result<Segment<'_>> {
    combinator::value(
        Segment::DeepWildcard,
        sequence::terminated(bytes::tag("**"), boundary),
    )(input)
}

fn wildcard(input: &str) -> Result<Segment<'_>> {
    combinator::value(
        Segment::Wildcard,
        sequence::terminated(bytes::tag("*"), boundary),
    )(input)
}

// `*` and `**` on their own are wildcards, anywhere else `*` is literal text.
fn literal(input: &str) -> Result<Segment<'_>> {
    let text = combinator::verify(bytes::is_not("/{}"), |lit: &str| lit != "*" && lit != "**");

    combinator::map(text, Segment::Literal)(input)
}

fn variable(input: &str) -> Result<Segment<'_>> {
    let (s, _) = character::char('{')(input)?;
    let (s, field_path) = error::context("field path", combinator::cut(field_path))(s)?;

    let sub_pattern = multi::separated_list1(character::char('/'), inner_segment);
    let (s, segments) = combinator::opt(sequence::preceded(
        character::char('='),
        combinator::cut(sub_pattern),
    ))(s)?;

    let (s, _) = error::context("closing brace", combinator::cut(character::char('}')))(s)?;

    Ok((
        s,
        Segment::Variable(Variable {
            field_path,
            segments: segments.unwrap_or_else(|| vec![Segment::Wildcard]),
        }),
    ))
}

fn ident(input: &str) -> Result<&str> {
    combinator::recognize(sequence::pair(
        branch::alt((character::alpha1, bytes::tag("_"))),
        multi::many0(branch::alt((character::alphanumeric1, bytes::tag("_")))),
    ))(input)
}

pub(crate) fn field_path(input: &str) -> Result<FieldPath<'_>> {
    multi::separated_list1(character::char('.'), ident)(input)
}
