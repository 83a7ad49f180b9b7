/*!
This library is the scoring core of a named-entity study over German-language parliamentary
transcripts: it resolves overlapping candidate mentions into consistent annotations, projects
annotations onto token sequences as begin/inside/outside tags, and scores any annotator's output
against manually annotated ground truth, per document and per corpus.

Tokenization, part-of-speech tagging and the statistical taggers themselves live outside this
crate. Everything that proposes entities is consumed through one contract, the [`Annotator`]
trait: given a text, produce a list of labeled spans. The built-in [`RuleBased`] annotator
implements that contract with gazetteer matching and greedy conflict resolution.

# Terminology
* A *span* is a labeled character range into a fixed base text. Spans compare by their
    `(label, start, end)` identity; the surface text is carried for exports only.
* The *label set* is fixed at three: `LOC`, `PER` and `ORG`. Macro-averaged figures always
    divide by three, no matter which labels actually occur in a document.
* An *exact span match* requires the full identity triple to agree. A prediction with correct
    offsets but the wrong label counts as both a false positive and a false negative.
* A *gazetteer* is a set of known surface strings per label, assembled once per process from
    roster and place records and shared read-only by every matching call.

# Example
```rust
use parlev::{evaluate, resolve, Candidate, Label, Span};

let text = "Europäische Kommission";
let candidates = vec![
    Candidate::new(Span::from_text(text, Label::Organization, 0, 23).unwrap()),
    Candidate::new(Span::from_text(text, Label::Organization, 13, 23).unwrap()),
];

// The longer candidate wins; the output is non-overlapping.
let resolved = resolve(candidates);
assert_eq!(resolved.len(), 1);
assert_eq!(resolved[0].text, "Europäische Kommission");

// A perfect prediction set scores 1.0 on its label, but the macro average
// still divides by the fixed label set of three.
let evaluation = evaluate(&resolved, &resolved);
assert!((evaluation.macro_f1 - 1.0 / 3.0).abs() < 1e-12);
```
*/

mod aggregate;
mod config;
mod document;
mod encoder;
mod gazetteer;
mod matcher;
mod metrics;
mod pipeline;
mod reporter;
mod resolver;
mod span;

pub use aggregate::{aggregate, Aggregate, DocumentScore};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Document, DocumentError};
pub use encoder::{encode, write_tags, Tag};
pub use gazetteer::{Gazetteer, GazetteerBuilder, GazetteerError, RosterColumn, RosterTable};
pub use matcher::{default_patterns, find_candidates, LemmaPattern};
pub use metrics::{evaluate, Evaluation, LabelMetrics};
pub use pipeline::{load_documents, run_pipeline, Annotator, PipelineOutput, RuleBased};
pub use reporter::{EntityRecord, ScoreReport, SummaryReport};
pub use resolver::resolve;
pub use span::{Candidate, InvalidSpan, Label, Span};
