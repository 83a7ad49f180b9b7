/*!
The consolidated scoring driver: load documents, let every annotator propose spans, evaluate each
proposal against the document's ground truth, and reduce the per-document results into the
corpus-level summaries. Annotators are opaque span producers behind the [`Annotator`] trait, so
the statistical taggers and the rule-based recognizer plug in interchangeably and tests can
substitute mocks.

Documents are independent units of work. With `parallel` set, they are mapped over a rayon pool
and merged in one reduction afterwards; nothing is accumulated under a lock, so result ordering
within a document batch never influences the outcome.
*/
use crate::aggregate::{aggregate, Aggregate, DocumentScore};
use crate::config::PipelineConfig;
use crate::document::Document;
use crate::gazetteer::Gazetteer;
use crate::matcher::{default_patterns, find_candidates, LemmaPattern};
use crate::metrics::evaluate;
use crate::reporter::{EntityRecord, ScoreReport, SummaryReport};
use crate::resolver::resolve;
use crate::span::Span;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Anything that produces a span set for a text: the rule-based recognizer, a pretrained tagger
/// behind FFI, a mock in tests. Implementations must be safe to call from worker threads.
pub trait Annotator: Sync {
    /// The model name used in score rows and entity records.
    fn name(&self) -> &str;

    /// Proposes entity spans with character offsets into `text`.
    fn annotate(&self, text: &str) -> Vec<Span>;
}

/// The gazetteer- and pattern-driven recognizer: permissive candidate matching followed by
/// greedy conflict resolution. The gazetteer is built once and shared read-only across calls.
pub struct RuleBased {
    gazetteer: Gazetteer,
    patterns: Vec<LemmaPattern>,
}

impl RuleBased {
    pub fn new(gazetteer: Gazetteer) -> Self {
        RuleBased {
            gazetteer,
            patterns: default_patterns(),
        }
    }

    pub fn with_patterns(gazetteer: Gazetteer, patterns: Vec<LemmaPattern>) -> Self {
        RuleBased {
            gazetteer,
            patterns,
        }
    }
}

impl Annotator for RuleBased {
    fn name(&self) -> &str {
        "rule_based"
    }

    fn annotate(&self, text: &str) -> Vec<Span> {
        resolve(find_candidates(text, &self.gazetteer, &self.patterns))
    }
}

/// Everything one run produces: the flat score rows, the per-annotator aggregates and, unless
/// disabled, the per-document entity records.
#[derive(Debug)]
pub struct PipelineOutput {
    pub scores: Vec<DocumentScore>,
    pub aggregates: BTreeMap<String, Aggregate>,
    pub records: Vec<EntityRecord>,
}

impl PipelineOutput {
    pub fn score_report(&self) -> ScoreReport {
        ScoreReport {
            rows: self.scores.clone(),
        }
    }

    pub fn summary_report(&self) -> SummaryReport {
        SummaryReport {
            rows: self.aggregates.clone(),
        }
    }
}

/// Loads a batch of container files, skipping documents that fail to load. Each failure is
/// logged with the document identifier; the run continues with the rest.
pub fn load_documents<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Vec<Document> {
    let mut documents = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match Document::load(path) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(document = %path.display(), %error, "skipping document");
            }
        }
    }
    documents
}

/// Scores every annotator on every document and reduces the results.
pub fn run_pipeline(
    documents: &[Document],
    annotators: &[Box<dyn Annotator>],
    config: &PipelineConfig,
) -> PipelineOutput {
    info!(
        documents = documents.len(),
        annotators = annotators.len(),
        parallel = config.parallel,
        "scoring documents"
    );
    let per_document: Vec<(Vec<DocumentScore>, Option<EntityRecord>)> = if config.parallel {
        documents
            .par_iter()
            .map(|document| score_document(document, annotators, config.entity_records))
            .collect()
    } else {
        documents
            .iter()
            .map(|document| score_document(document, annotators, config.entity_records))
            .collect()
    };

    let mut scores = Vec::new();
    let mut records = Vec::new();
    for (rows, record) in per_document {
        scores.extend(rows);
        records.extend(record);
    }
    let aggregates = aggregate(&scores);
    PipelineOutput {
        scores,
        aggregates,
        records,
    }
}

fn score_document(
    document: &Document,
    annotators: &[Box<dyn Annotator>],
    keep_records: bool,
) -> (Vec<DocumentScore>, Option<EntityRecord>) {
    let mut rows = Vec::with_capacity(annotators.len());
    let mut by_annotator = BTreeMap::new();
    for annotator in annotators {
        let predictions = annotator.annotate(&document.text);
        let evaluation = evaluate(&document.ground_truth, &predictions);
        rows.push(DocumentScore {
            filename: document.id.clone(),
            annotator: annotator.name().to_string(),
            evaluation,
        });
        if keep_records {
            by_annotator.insert(annotator.name().to_string(), predictions);
        }
    }
    let record = keep_records.then(|| EntityRecord {
        filename: document.id.clone(),
        ground_truth: document.ground_truth.clone(),
        annotators: by_annotator,
    });
    (rows, record)
}
