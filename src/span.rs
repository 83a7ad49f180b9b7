/*!
This module contains the span value type shared by every other module: a labeled character range
pointing into some base text. Two spans are considered the same mention when their label and
offsets agree; the surface text is carried along for exports but is excluded from identity, so
duplicate-offset spans coming from different annotators collapse correctly in set operations.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

/// The fixed label set of the corpus. The declaration order (`LOC`, `PER`, `ORG`) is the column
/// order of every report and the iteration order of `enum_iterator::all`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize,
)]
pub enum Label {
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
}

impl Label {
    /// The canonical short label used in exports.
    pub fn as_label(&self) -> &'static str {
        match self {
            Label::Location => "LOC",
            Label::Person => "PER",
            Label::Organization => "ORG",
        }
    }

    /// Parses a label as written by the various annotation sources. Returns `None` for labels
    /// outside the target set (`MISC`, `DATE`, ...), which callers are expected to drop.
    pub fn from_label(label: &str) -> Option<Label> {
        match label.trim().to_uppercase().as_str() {
            "LOC" | "LOCATION" | "GPE" => Some(Label::Location),
            "PER" | "PERS" | "PERSON" => Some(Label::Person),
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Some(Label::Organization),
            _ => None,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A labeled character range into a fixed base text. Offsets are byte offsets, `end` exclusive.
/// The invariant `0 <= start < end <= base.len()` and `text == base[start..end]` is checked by
/// [`Span::from_text`]; [`Span::new`] trusts its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub label: Label,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(text: impl Into<String>, label: Label, start: usize, end: usize) -> Self {
        Span {
            text: text.into(),
            label,
            start,
            end,
        }
    }

    /// Builds a span over `base`, validating the offset invariant and deriving the surface text.
    pub fn from_text(
        base: &str,
        label: Label,
        start: usize,
        end: usize,
    ) -> Result<Span, InvalidSpan> {
        if start >= end {
            return Err(InvalidSpan::Reversed { start, end });
        }
        if end > base.len() {
            return Err(InvalidSpan::OutOfBounds {
                end,
                len: base.len(),
            });
        }
        if !base.is_char_boundary(start) || !base.is_char_boundary(end) {
            return Err(InvalidSpan::NotCharBoundary { start, end });
        }
        Ok(Span::new(&base[start..end], label, start, end))
    }

    /// The identity triple used for equality, hashing and exact-match evaluation.
    pub fn identity(&self) -> (Label, usize, usize) {
        (self.label, self.start, self.end)
    }

    /// Two spans overlap iff they share at least one character position.
    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }
}

/// Equality and hashing go through the identity triple only; `text` is derived data.
impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Span {}

impl Hash for Span {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.label, self.start, self.end)
    }
}

/// A candidate mention emitted by the matcher, before conflict resolution. The match length only
/// matters while resolving; the resolver unwraps candidates back into plain spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub span: Span,
}

impl Candidate {
    pub fn new(span: Span) -> Self {
        Candidate { span }
    }

    pub fn match_length(&self) -> usize {
        self.span.end - self.span.start
    }
}

/// Violation of the span offset invariant. This is a caller contract violation, not a condition
/// the resolver or encoder recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSpan {
    Reversed { start: usize, end: usize },
    OutOfBounds { end: usize, len: usize },
    NotCharBoundary { start: usize, end: usize },
}

impl Display for InvalidSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSpan::Reversed { start, end } => {
                write!(f, "span start {} is not before its end {}", start, end)
            }
            InvalidSpan::OutOfBounds { end, len } => {
                write!(f, "span end {} is past the end of the text ({})", end, len)
            }
            InvalidSpan::NotCharBoundary { start, end } => {
                write!(
                    f,
                    "span offsets ({}, {}) do not fall on character boundaries",
                    start, end
                )
            }
        }
    }
}

impl Error for InvalidSpan {}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    #[test]
    fn identity_ignores_text() {
        let a = Span::new("Wien", Label::Location, 10, 14);
        let b = Span::new("wien", Label::Location, 10, 14);
        assert_eq!(a, b);
        let mut set = AHashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn identity_distinguishes_label_and_offsets() {
        let a = Span::new("Wien", Label::Location, 10, 14);
        assert_ne!(a, Span::new("Wien", Label::Organization, 10, 14));
        assert_ne!(a, Span::new("Wien", Label::Location, 11, 15));
    }

    #[test]
    fn from_text_derives_surface_text() {
        let base = "Die Sitzung findet in Wien statt.";
        let span = Span::from_text(base, Label::Location, 22, 26).unwrap();
        assert_eq!(span.text, "Wien");
    }

    #[test]
    fn from_text_rejects_invalid_offsets() {
        let base = "Österreich";
        assert_eq!(
            Span::from_text(base, Label::Location, 4, 4),
            Err(InvalidSpan::Reversed { start: 4, end: 4 })
        );
        assert_eq!(
            Span::from_text(base, Label::Location, 0, 99),
            Err(InvalidSpan::OutOfBounds { end: 99, len: 11 })
        );
        // 'Ö' is two bytes wide; offset 1 falls inside it.
        assert_eq!(
            Span::from_text(base, Label::Location, 1, 3),
            Err(InvalidSpan::NotCharBoundary { start: 1, end: 3 })
        );
    }

    #[test]
    fn overlap_is_symmetric_and_exclusive_at_boundaries() {
        let a = Span::new("", Label::Person, 0, 4);
        let touching = Span::new("", Label::Person, 4, 8);
        let inside = Span::new("", Label::Person, 2, 3);
        let crossing = Span::new("", Label::Person, 3, 6);
        assert!(!a.overlaps(&touching));
        assert!(!touching.overlaps(&a));
        assert!(a.overlaps(&inside));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }
}
