/*!
This module scores an annotator's span set against ground truth. Matching is exact: a prediction
is a true positive only when an identical (label, start, end) triple exists in the truth set.
Zero denominators resolve to 0.0 by convention, never by special-casing a "perfect empty match":
a label absent from both sides contributes an F1 of 0.0 to the macro average, and the macro
average always divides by the full label set of three, not by the labels that happen to occur.
*/
use crate::span::{Label, Span};
use ahash::AHashSet;
use enum_iterator::{all, cardinality};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and derived metrics for one label.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelMetrics {
    #[serde(rename = "TP")]
    pub true_positives: usize,
    #[serde(rename = "FP")]
    pub false_positives: usize,
    #[serde(rename = "FN")]
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl LabelMetrics {
    /// Derives precision, recall and F1 from raw counts, resolving zero denominators to 0.0.
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
    ) -> Self {
        let precision = if true_positives + false_positives > 0 {
            true_positives as f64 / (true_positives + false_positives) as f64
        } else {
            0.0
        };
        let recall = if true_positives + false_negatives > 0 {
            true_positives as f64 / (true_positives + false_negatives) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        LabelMetrics {
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1,
        }
    }
}

/// Per-document evaluation result: one [`LabelMetrics`] per label of the fixed set, plus the
/// macro-F1 over exactly that set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub macro_f1: f64,
    pub per_label: BTreeMap<Label, LabelMetrics>,
}

/// Scores `predictions` against `ground_truth` by exact span match over the fixed label set.
pub fn evaluate(ground_truth: &[Span], predictions: &[Span]) -> Evaluation {
    let truth: AHashSet<(Label, usize, usize)> = ground_truth.iter().map(Span::identity).collect();
    let predicted: AHashSet<(Label, usize, usize)> =
        predictions.iter().map(Span::identity).collect();

    let mut per_label = BTreeMap::new();
    let mut f1_sum = 0.0;
    for label in all::<Label>() {
        let true_positives = predicted
            .intersection(&truth)
            .filter(|id| id.0 == label)
            .count();
        let false_positives = predicted
            .difference(&truth)
            .filter(|id| id.0 == label)
            .count();
        let false_negatives = truth
            .difference(&predicted)
            .filter(|id| id.0 == label)
            .count();
        let metrics = LabelMetrics::from_counts(true_positives, false_positives, false_negatives);
        f1_sum += metrics.f1;
        per_label.insert(label, metrics);
    }

    Evaluation {
        macro_f1: f1_sum / cardinality::<Label>() as f64,
        per_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn span(label: Label, start: usize, end: usize) -> Span {
        Span::new("", label, start, end)
    }

    #[test]
    fn identical_sets_score_one_for_occupied_labels() {
        let truth = vec![
            span(Label::Person, 0, 4),
            span(Label::Location, 10, 15),
            span(Label::Organization, 20, 30),
        ];
        let result = evaluate(&truth, &truth);
        for (_, metrics) in &result.per_label {
            assert_eq!(metrics.precision, 1.0);
            assert_eq!(metrics.recall, 1.0);
            assert_eq!(metrics.f1, 1.0);
        }
        assert_eq!(result.macro_f1, 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero_everywhere() {
        let truth = vec![span(Label::Person, 0, 4)];
        let predictions = vec![span(Label::Person, 5, 9)];
        let result = evaluate(&truth, &predictions);
        let person = &result.per_label[&Label::Person];
        assert_eq!(person.true_positives, 0);
        assert_eq!(person.false_positives, 1);
        assert_eq!(person.false_negatives, 1);
        assert_eq!(person.f1, 0.0);
        assert_eq!(result.macro_f1, 0.0);
    }

    #[test]
    fn mixed_scenario_macro_divides_by_three() {
        let truth = vec![span(Label::Person, 0, 4), span(Label::Location, 10, 15)];
        let predictions = vec![span(Label::Person, 0, 4), span(Label::Organization, 20, 25)];
        let result = evaluate(&truth, &predictions);

        let person = &result.per_label[&Label::Person];
        assert_eq!((person.true_positives, person.false_positives, person.false_negatives), (1, 0, 0));
        assert_eq!(person.f1, 1.0);

        let location = &result.per_label[&Label::Location];
        assert_eq!((location.true_positives, location.false_positives, location.false_negatives), (0, 0, 1));
        assert_eq!(location.f1, 0.0);

        let organization = &result.per_label[&Label::Organization];
        assert_eq!((organization.true_positives, organization.false_positives, organization.false_negatives), (0, 1, 0));
        assert_eq!(organization.f1, 0.0);

        assert!((result.macro_f1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn label_mismatch_at_same_offsets_is_both_fp_and_fn() {
        let truth = vec![span(Label::Location, 3, 8)];
        let predictions = vec![span(Label::Organization, 3, 8)];
        let result = evaluate(&truth, &predictions);
        assert_eq!(result.per_label[&Label::Location].false_negatives, 1);
        assert_eq!(result.per_label[&Label::Organization].false_positives, 1);
    }

    #[test]
    fn duplicate_spans_collapse_before_counting() {
        let truth = vec![span(Label::Person, 0, 4)];
        let predictions = vec![
            Span::new("Karl", Label::Person, 0, 4),
            Span::new("KARL", Label::Person, 0, 4),
        ];
        let result = evaluate(&truth, &predictions);
        let person = &result.per_label[&Label::Person];
        assert_eq!(person.true_positives, 1);
        assert_eq!(person.false_positives, 0);
    }

    #[test]
    fn empty_label_contributes_zero_not_one() {
        // Nothing predicted, nothing expected: still 0.0 by the zero-denominator convention.
        let result = evaluate(&[], &[]);
        assert_eq!(result.macro_f1, 0.0);
        for (_, metrics) in &result.per_label {
            assert_eq!(metrics.f1, 0.0);
        }
    }

    #[rstest]
    #[case(0, 0, 0, 0.0, 0.0, 0.0)]
    #[case(1, 0, 0, 1.0, 1.0, 1.0)]
    #[case(0, 3, 0, 0.0, 0.0, 0.0)]
    #[case(0, 0, 3, 0.0, 0.0, 0.0)]
    #[case(2, 2, 0, 0.5, 1.0, 2.0 / 3.0)]
    #[case(2, 0, 2, 1.0, 0.5, 2.0 / 3.0)]
    #[case(1, 1, 1, 0.5, 0.5, 0.5)]
    fn counts_to_metrics(
        #[case] tp: usize,
        #[case] fp: usize,
        #[case] fn_: usize,
        #[case] precision: f64,
        #[case] recall: f64,
        #[case] f1: f64,
    ) {
        let metrics = LabelMetrics::from_counts(tp, fp, fn_);
        assert!((metrics.precision - precision).abs() < 1e-12);
        assert!((metrics.recall - recall).abs() < 1e-12);
        assert!((metrics.f1 - f1).abs() < 1e-12);
    }
}
