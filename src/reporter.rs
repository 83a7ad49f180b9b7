/*!
Export shapes for scoring runs. The two score tables act like dataframes when displayed: the
`Display` implementations write a CSV header followed by one row per entry, with the per-label
metric columns repeated for each label of the fixed set in its canonical order. The per-document
entity record serializes to JSON with one top-level key per annotator next to the ground truth.
*/
use crate::aggregate::{Aggregate, DocumentScore};
use crate::metrics::LabelMetrics;
use crate::span::{Label, Span};
use enum_iterator::all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

const METRIC_NAMES: &[&str] = &["TP", "FP", "FN", "precision", "recall", "f1"];

fn write_metric_header(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for label in all::<Label>() {
        for metric in METRIC_NAMES {
            write!(f, ",{}_{}", metric, label)?;
        }
    }
    Ok(())
}

fn write_metric_cells(f: &mut fmt::Formatter<'_>, metrics: &LabelMetrics) -> fmt::Result {
    write!(
        f,
        ",{},{},{},{},{},{}",
        metrics.true_positives,
        metrics.false_positives,
        metrics.false_negatives,
        metrics.precision,
        metrics.recall,
        metrics.f1
    )
}

/// The per-(document, annotator) score table: `filename,model,macro_f1`, then the metric columns
/// per label.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoreReport {
    pub rows: Vec<DocumentScore>,
}

impl Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filename,model,macro_f1")?;
        write_metric_header(f)?;
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{},{},{}", row.filename, row.annotator, row.evaluation.macro_f1)?;
            for (_, metrics) in &row.evaluation.per_label {
                write_metric_cells(f, metrics)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The per-annotator summary table, computed from counts summed over all documents.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryReport {
    pub rows: BTreeMap<String, Aggregate>,
}

impl Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model,num_docs,macro_f1_mean,macro_f1_macro_over_labels")?;
        write_metric_header(f)?;
        writeln!(f)?;
        for (annotator, aggregate) in &self.rows {
            write!(
                f,
                "{},{},{},{}",
                annotator,
                aggregate.num_docs,
                aggregate.macro_f1_mean,
                aggregate.macro_f1_macro_over_labels
            )?;
            for (_, metrics) in &aggregate.per_label {
                write_metric_cells(f, metrics)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One document's entity sets: ground truth plus every annotator's predictions, keyed by
/// annotator name at the top level of the JSON record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub filename: String,
    pub ground_truth: Vec<Span>,
    #[serde(flatten)]
    pub annotators: BTreeMap<String, Vec<Span>>,
}

impl EntityRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
