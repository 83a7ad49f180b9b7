/*!
Corpus-level aggregation of per-document evaluation results, per annotator. Two macro-F1 figures
come out of this and they are not interchangeable: `macro_f1_mean` averages each document's
already-averaged macro-F1 (a mean of ratios), while `macro_f1_macro_over_labels` first sums the
raw counts over all documents, recomputes per-label metrics from those sums, and then averages
the recomputed F1 values (ratios of sums). They diverge whenever label frequency varies across
documents, and both are always reported.

The fold is a plain map-then-reduce: per-document results are produced independently and merged
here in a single reduction, so result ordering never matters.
*/
use crate::metrics::{Evaluation, LabelMetrics};
use crate::span::Label;
use enum_iterator::{all, cardinality};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

/// One evaluated (document, annotator) pair, the aggregator's input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentScore {
    pub filename: String,
    pub annotator: String,
    pub evaluation: Evaluation,
}

/// Corpus-level summary for one annotator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub num_docs: usize,
    pub macro_f1_mean: f64,
    pub macro_f1_macro_over_labels: f64,
    /// Metrics recomputed from the TP/FP/FN counts summed over all documents.
    pub per_label: BTreeMap<Label, LabelMetrics>,
}

#[derive(Debug, Default)]
struct Accumulator {
    num_docs: usize,
    macro_f1_sum: f64,
    counts: BTreeMap<Label, (usize, usize, usize)>,
}

impl Accumulator {
    fn add(&mut self, evaluation: &Evaluation) {
        self.num_docs += 1;
        self.macro_f1_sum += evaluation.macro_f1;
        for (label, metrics) in &evaluation.per_label {
            let entry = self.counts.entry(*label).or_default();
            entry.0 += metrics.true_positives;
            entry.1 += metrics.false_positives;
            entry.2 += metrics.false_negatives;
        }
    }

    fn finish(self) -> Aggregate {
        let mut per_label = BTreeMap::new();
        let mut f1_sum = 0.0;
        for label in all::<Label>() {
            let (tp, fp, fn_) = self.counts.get(&label).copied().unwrap_or_default();
            let metrics = LabelMetrics::from_counts(tp, fp, fn_);
            f1_sum += metrics.f1;
            per_label.insert(label, metrics);
        }
        let macro_f1_mean = if self.num_docs > 0 {
            self.macro_f1_sum / self.num_docs as f64
        } else {
            0.0
        };
        Aggregate {
            num_docs: self.num_docs,
            macro_f1_mean,
            macro_f1_macro_over_labels: f1_sum / cardinality::<Label>() as f64,
            per_label,
        }
    }
}

/// Folds per-document scores into one [`Aggregate`] per annotator.
pub fn aggregate(scores: &[DocumentScore]) -> BTreeMap<String, Aggregate> {
    scores
        .iter()
        .map(|score| (score.annotator.clone(), &score.evaluation))
        .into_group_map()
        .into_iter()
        .map(|(annotator, evaluations)| {
            let mut accumulator = Accumulator::default();
            for evaluation in evaluations {
                accumulator.add(evaluation);
            }
            (annotator, accumulator.finish())
        })
        .collect()
}
