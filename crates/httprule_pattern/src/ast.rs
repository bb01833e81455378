use std::fmt;

/// A dotted reference into a request message, e.g. `sub.subfield`.
pub type FieldPath<'i> = Vec<&'i str>;

/// One slash-delimited unit of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'i> {
    /// Literal text that must match the path element exactly.
    Literal(&'i str),
    /// `*`, matches exactly one path element.
    Wildcard,
    /// `**`, matches one or more trailing path elements.
    DeepWildcard,
    /// `{field.path=sub/pattern}`, captures into a request field.
    Variable(Variable<'i>),
}

/// A variable segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable<'i> {
    /// Field that receives the captured value.
    pub field_path: FieldPath<'i>,
    /// Segments matched by the variable.
    ///
    /// When no sub-pattern is written, this is a single [`Segment::Wildcard`].
    pub segments: Vec<Segment<'i>>,
}

impl Variable<'_> {
    /// Number of path elements this variable captures, `None` if it ends in a
    /// deep wildcard and so captures the rest of the path.
    pub fn width(&self) -> Option<usize> {
        if self.segments.contains(&Segment::DeepWildcard) {
            None
        } else {
            Some(self.segments.len())
        }
    }

    /// Dotted form of the field path.
    pub fn dotted_path(&self) -> String {
        self.field_path.join(".")
    }

    fn has_implicit_segments(&self) -> bool {
        self.segments == [Segment::Wildcard]
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(lit) => f.write_str(lit),
            Segment::Wildcard => f.write_str("*"),
            Segment::DeepWildcard => f.write_str("**"),
            Segment::Variable(var) => write!(f, "{}", var),
        }
    }
}

impl fmt::Display for Variable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.dotted_path())?;

        if !self.has_implicit_segments() {
            f.write_str("=")?;
            write_segments(f, &self.segments)?;
        }

        f.write_str("}")
    }
}

pub(crate) fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[Segment<'_>]) -> fmt::Result {
    if let Some((first, rest)) = segments.split_first() {
        write!(f, "{}", first)?;

        for seg in rest {
            write!(f, "/{}", seg)?;
        }
    }

    Ok(())
}
