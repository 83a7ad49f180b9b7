/*!
Projection of a resolved span set onto a token sequence as begin/inside/outside tags, plus the
line-oriented tag export used for corpus dumps. Tokens come from an external tokenizer and are
given as `(start, end)` character ranges over the same base text as the spans.

The begin/inside state is scoped to one entity at a time: each entity tags its first overlapping
token `B-` and the rest `I-`, independently of its neighbours. Two same-label entities touching
with no gap therefore emit two consecutive `B-` tags instead of one `B-`/`I-` run; the source
annotations do not disambiguate the two readings, so the behavior is kept as is.
*/
use crate::span::{Label, Span};
use std::fmt::{self, Display};
use std::io::{self, Write};

/// One per-token tag in the BIO scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Outside,
    Begin(Label),
    Inside(Label),
}

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Outside => write!(f, "O"),
            Tag::Begin(label) => write!(f, "B-{}", label),
            Tag::Inside(label) => write!(f, "I-{}", label),
        }
    }
}

/// Tags every token against the given non-overlapping span set. A token belongs to an entity
/// when it overlaps the entity's range by at least one character; full containment is the common
/// case, partial boundary overlap covers tokenization drift against the annotation boundaries.
pub fn encode(tokens: &[(usize, usize)], spans: &[Span]) -> Vec<Tag> {
    let mut tags = vec![Tag::Outside; tokens.len()];
    for span in spans {
        let mut started = false;
        for (i, &(begin, end)) in tokens.iter().enumerate() {
            if begin >= span.end || end <= span.start {
                continue;
            }
            if started {
                tags[i] = Tag::Inside(span.label);
            } else {
                tags[i] = Tag::Begin(span.label);
                started = true;
            }
        }
    }
    tags
}

/// Writes the tag projection as one token per line (`text<TAB>start<TAB>end<TAB>tag`) with a
/// blank line between sentences. Entities are encoded against the flattened token sequence, so
/// a span crossing a sentence break keeps its `I-` continuation.
pub fn write_tags<W: Write>(
    out: &mut W,
    text: &str,
    sentences: &[Vec<(usize, usize)>],
    spans: &[Span],
) -> io::Result<()> {
    let tokens: Vec<(usize, usize)> = sentences.iter().flatten().copied().collect();
    let tags = encode(&tokens, spans);
    let mut next = 0;
    for (index, sentence) in sentences.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        for &(begin, end) in sentence {
            let form = text.get(begin..end).unwrap_or("");
            writeln!(out, "{}\t{}\t{}\t{}", form, begin, end, tags[next])?;
            next += 1;
        }
    }
    Ok(())
}
