//! evaluation::binary — threshold-sweep metrics for binary classifiers.
//!
//! Purpose
//! -------
//! Compute area under ROC, area under precision/recall, and the peak F1
//! score from `(score, label)` pairs in one sorted sweep.
//!
//! Key behaviors
//! -------------
//! - Records are sorted by score, descending; every distinct score is one
//!   threshold, so tied scores move together (no credit for tie order).
//! - The ROC curve runs from (0, 0) to (1, 1); the PR curve starts at
//!   (recall 0, precision of the first threshold). Areas are trapezoidal.
//! - Labels `> 0.5` are positive.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scores are finite; NaN scores would make the sort order meaningless
//!   and are ordered by `f64::total_cmp` without further checks.
//! - Both classes must be present, otherwise
//!   [`EvalError::DegenerateLabels`] is returned.
use std::cmp::Ordering;

use crate::evaluation::errors::{EvalError, EvalResult};

/// Areas and peak F1 from one sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryMetrics {
    pub area_under_roc: f64,
    pub area_under_precision_recall: f64,
    pub peak_f1: f64,
}

/// Confusion counts at one threshold.
#[derive(Debug, Clone, Copy)]
struct ThresholdCounts {
    true_positives: usize,
    false_positives: usize,
}

/// Sweep every threshold of `scored` (pairs of `(score, label)`).
///
/// # Errors
/// [`EvalError::DegenerateLabels`] if all labels belong to one class.
pub fn binary_metrics(scored: &mut [(f64, f64)]) -> EvalResult<BinaryMetrics> {
    let positives = scored.iter().filter(|(_, label)| *label > 0.5).count();
    let negatives = scored.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvalError::DegenerateLabels { positives, negatives });
    }

    scored.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
    let thresholds = sweep(scored);

    let (p, n) = (positives as f64, negatives as f64);
    let mut roc = vec![(0.0, 0.0)];
    let mut pr = Vec::with_capacity(thresholds.len() + 1);
    let mut peak_f1 = 0.0_f64;
    for counts in &thresholds {
        let tp = counts.true_positives as f64;
        let fp = counts.false_positives as f64;
        let recall = tp / p;
        let precision = tp / (tp + fp);
        if pr.is_empty() {
            pr.push((0.0, precision));
        }
        roc.push((fp / n, recall));
        pr.push((recall, precision));
        if precision + recall > 0.0 {
            peak_f1 = peak_f1.max(2.0 * precision * recall / (precision + recall));
        }
    }
    roc.push((1.0, 1.0));

    Ok(BinaryMetrics {
        area_under_roc: trapezoid(&roc),
        area_under_precision_recall: trapezoid(&pr),
        peak_f1,
    })
}

/// Cumulative counts at the end of every run of equal scores.
fn sweep(sorted: &[(f64, f64)]) -> Vec<ThresholdCounts> {
    let mut thresholds = Vec::new();
    let mut counts = ThresholdCounts { true_positives: 0, false_positives: 0 };
    for (i, &(score, label)) in sorted.iter().enumerate() {
        if label > 0.5 {
            counts.true_positives += 1;
        } else {
            counts.false_positives += 1;
        }
        let run_ends = sorted
            .get(i + 1)
            .is_none_or(|&(next, _)| next.total_cmp(&score) != Ordering::Equal);
        if run_ends {
            thresholds.push(counts);
        }
    }
    thresholds
}

fn trapezoid(points: &[(f64, f64)]) -> f64 {
    points.windows(2).map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Perfect and interleaved rankings with hand-computed curves.
    // - Tied scores collapsing into one threshold.
    // - Single-class labels.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A perfect ranking scores 1 on every metric.
    fn perfect_ranking_scores_one() {
        let mut scored = vec![(0.3, 0.0), (0.9, 1.0), (0.1, 0.0), (0.8, 1.0)];
        let metrics = binary_metrics(&mut scored).unwrap();
        assert_relative_eq!(metrics.area_under_roc, 1.0);
        assert_relative_eq!(metrics.area_under_precision_recall, 1.0);
        assert_relative_eq!(metrics.peak_f1, 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Interleaved labels give the hand-computed curve areas.
    //
    // Given
    // -----
    // - scores 0.9, 0.8, 0.7, 0.6 with labels 1, 0, 1, 0.
    //
    // Expect
    // ------
    // - ROC (0,0) (0,½) (½,½) (½,1) (1,1): area 0.75.
    // - PR (0,1) (½,1) (½,½) (1,⅔) (1,½): area ½ + ½·(½ + ⅔)/2 = 19/24.
    // - F1 peaks at precision ⅔, recall 1: 0.8.
    fn interleaved_ranking_matches_hand_computation() {
        // Arrange
        let mut scored = vec![(0.6, 0.0), (0.8, 0.0), (0.9, 1.0), (0.7, 1.0)];

        // Act
        let metrics = binary_metrics(&mut scored).unwrap();

        // Assert
        assert_relative_eq!(metrics.area_under_roc, 0.75, epsilon = 1e-12);
        assert_relative_eq!(metrics.area_under_precision_recall, 19.0 / 24.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.peak_f1, 0.8, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // All-tied scores form a single threshold: the ROC is the diagonal.
    fn tied_scores_form_one_threshold() {
        let mut scored = vec![(0.5, 1.0), (0.5, 0.0)];
        let metrics = binary_metrics(&mut scored).unwrap();
        assert_relative_eq!(metrics.area_under_roc, 0.5, epsilon = 1e-12);
        assert_relative_eq!(metrics.area_under_precision_recall, 0.5, epsilon = 1e-12);
        assert_relative_eq!(metrics.peak_f1, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn single_class_labels_are_rejected() {
        let mut scored = vec![(0.2, 1.0), (0.4, 1.0)];
        assert_eq!(
            binary_metrics(&mut scored),
            Err(EvalError::DegenerateLabels { positives: 2, negatives: 0 })
        );
    }
}
