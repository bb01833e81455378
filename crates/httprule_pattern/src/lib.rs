//! # HTTP path template parser
//!
//! This library provides a [`nom`] based parser for the path templates used
//! by `google.api.http` rules, e.g. `/v1/messages/{message_id}/{sub.subfield}`.
//!
//! Only syntactic validations are made here. Resolving the variables field
//! paths against a message is responsibility of the caller.
use std::fmt;

use nom::error::{VerboseError, VerboseErrorKind};

#[cfg(test)]
macro_rules! assert_output {
    ($parser: ident, $input: expr, $output: expr) => {
        assert_eq!($parser($input).unwrap().1, $output)
    };
}

#[cfg(test)]
macro_rules! test_parser {
    ($parser: ident, $($input: expr => $output: expr,)+) => {
        $(assert_output!($parser, $input, $output);)+
    }
}

pub mod ast;
mod lexer;

pub use self::ast::{FieldPath, Segment, Variable};

/// Errors raised while parsing a path template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("malformed pattern {pattern:?} at offset {offset}: {reason}")]
    Malformed {
        pattern: String,
        offset: usize,
        reason: String,
    },
    #[error("pattern {pattern:?} has more than one deep wildcard")]
    MultipleDeepWildcard { pattern: String },
    #[error("deep wildcard must be the last segment of pattern {pattern:?}")]
    MisplacedDeepWildcard { pattern: String },
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'i> {
    pattern: &'i str,
    segments: Vec<Segment<'i>>,
    verb: Option<&'i str>,
}

impl<'i> Template<'i> {
    /// Parse `pattern` into its segments.
    pub fn parse(pattern: &'i str) -> Result<Self, PatternError> {
        let (segments, verb) = match lexer::template(pattern) {
            Ok((_, parsed)) => parsed,
            Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
                return Err(malformed(pattern, err))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(PatternError::Malformed {
                    pattern: pattern.to_string(),
                    offset: pattern.len(),
                    reason: "incomplete input".to_string(),
                })
            }
        };

        check_deep_wildcard(pattern, &segments)?;

        Ok(Self {
            pattern,
            segments,
            verb,
        })
    }

    /// The raw pattern string this template was parsed from.
    pub fn pattern(&self) -> &'i str {
        self.pattern
    }

    /// The top-level segments, in template order.
    pub fn segments(&self) -> &[Segment<'i>] {
        &self.segments
    }

    /// The custom verb after the last segment, e.g. `publish` in
    /// `/v1/messages/{message_id}:publish`.
    pub fn verb(&self) -> Option<&'i str> {
        self.verb
    }

    /// The variables of this template, in template order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable<'i>> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Variable(var) => Some(var),
            _ => None,
        })
    }
}

impl fmt::Display for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        ast::write_segments(f, &self.segments)?;

        match self.verb {
            Some(verb) => write!(f, ":{}", verb),
            None => Ok(()),
        }
    }
}

fn malformed(pattern: &str, err: VerboseError<&str>) -> PatternError {
    let offset = err
        .errors
        .first()
        .map_or(pattern.len(), |(rem, _)| pattern.len() - rem.len());

    let reason = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(format!("invalid {}", ctx)),
            _ => None,
        })
        .or_else(|| {
            err.errors.first().map(|(_, kind)| match kind {
                VerboseErrorKind::Char(c) => format!("expected '{}'", c),
                VerboseErrorKind::Nom(kind) => kind.description().to_string(),
                VerboseErrorKind::Context(ctx) => format!("invalid {}", ctx),
            })
        })
        .unwrap_or_else(|| "unexpected input".to_string());

    PatternError::Malformed {
        pattern: pattern.to_string(),
        offset,
        reason,
    }
}

// At most one `**` may appear and it must close the flattened pattern.
fn check_deep_wildcard(pattern: &str, segments: &[Segment<'_>]) -> Result<(), PatternError> {
    let flat: Vec<&Segment<'_>> = segments
        .iter()
        .flat_map(|seg| match seg {
            Segment::Variable(var) => var.segments.iter().collect::<Vec<_>>(),
            seg => vec![seg],
        })
        .collect();

    let deep: Vec<usize> = flat
        .iter()
        .enumerate()
        .filter(|(_, seg)| ***seg == Segment::DeepWildcard)
        .map(|(idx, _)| idx)
        .collect();

    match deep.as_slice() {
        [] => Ok(()),
        [idx] if *idx + 1 == flat.len() => Ok(()),
        [_] => Err(PatternError::MisplacedDeepWildcard {
            pattern: pattern.to_string(),
        }),
        _ => Err(PatternError::MultipleDeepWildcard {
            pattern: pattern.to_string(),
        }),
    }
}
