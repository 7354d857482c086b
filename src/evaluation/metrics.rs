//! evaluation::metrics — metric names and the static metadata table.
//!
//! Purpose
//! -------
//! Fix the names under which [`evaluate`](crate::evaluation::evaluate)
//! reports metrics and associate each with a description, a comparison
//! order, and an optional valid range. The table is immutable process-wide
//! data; nothing here is computed.
//!
//! Conventions
//! -----------
//! - Keys of an evaluation result are always one of the `*` name constants.
//! - Ranges are closed intervals; `None` means unbounded.

/// Mean of `|score − label|`.
pub const MEAN_ABSOLUTE_ERROR: &str = "Mean absolute error";
/// Mean of `(score − label)²`.
pub const MEAN_SQUARE_ERROR: &str = "Mean square error";
/// Square root of the mean square error.
pub const ROOT_MEAN_SQUARE_ERROR: &str = "Root mean square error";
/// Area under the precision/recall curve.
pub const AREA_UNDER_PRECISION_RECALL: &str = "Area under precision/recall";
/// Area under the ROC curve.
pub const AREA_UNDER_ROC: &str = "Area under ROC";
/// Maximum F1 over all decision thresholds.
pub const PEAK_F1_SCORE: &str = "Peak F1 score";
/// Mean per-record log-likelihood.
pub const DATA_LOG_LIKELIHOOD: &str = "Per-datum log likelihood";
/// Small-sample corrected Akaike information criterion.
pub const AKAIKE_INFORMATION_CRITERION: &str = "Akaike information criterion";

/// Which direction of a metric is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricOrdering {
    HigherIsBetter,
    LowerIsBetter,
}

/// Static description of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub ordering: MetricOrdering,
    pub range: Option<(f64, f64)>,
}

impl MetricMetadata {
    /// `true` when `candidate` is strictly better than `incumbent`.
    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self.ordering {
            MetricOrdering::HigherIsBetter => candidate > incumbent,
            MetricOrdering::LowerIsBetter => candidate < incumbent,
        }
    }

    /// `true` when `value` is not NaN and lies inside the metric's range.
    pub fn validate_range(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.range {
            Some((lower, upper)) => (lower..=upper).contains(&value),
            None => true,
        }
    }
}

/// Every metric the engine can report.
pub static METRIC_METADATA: [MetricMetadata; 8] = [
    MetricMetadata {
        name: MEAN_ABSOLUTE_ERROR,
        description: "Mean absolute difference between score and label",
        ordering: MetricOrdering::LowerIsBetter,
        range: Some((0.0, f64::INFINITY)),
    },
    MetricMetadata {
        name: MEAN_SQUARE_ERROR,
        description: "Mean squared difference between score and label",
        ordering: MetricOrdering::LowerIsBetter,
        range: Some((0.0, f64::INFINITY)),
    },
    MetricMetadata {
        name: ROOT_MEAN_SQUARE_ERROR,
        description: "Square root of the mean squared error",
        ordering: MetricOrdering::LowerIsBetter,
        range: Some((0.0, f64::INFINITY)),
    },
    MetricMetadata {
        name: AREA_UNDER_PRECISION_RECALL,
        description: "Area under the precision/recall curve",
        ordering: MetricOrdering::HigherIsBetter,
        range: Some((0.0, 1.0)),
    },
    MetricMetadata {
        name: AREA_UNDER_ROC,
        description: "Area under the receiver operating characteristic curve",
        ordering: MetricOrdering::HigherIsBetter,
        range: Some((0.0, 1.0)),
    },
    MetricMetadata {
        name: PEAK_F1_SCORE,
        description: "Best F1 score over all decision thresholds",
        ordering: MetricOrdering::HigherIsBetter,
        range: Some((0.0, 1.0)),
    },
    MetricMetadata {
        name: DATA_LOG_LIKELIHOOD,
        description: "Mean log-likelihood of a record under the model",
        ordering: MetricOrdering::HigherIsBetter,
        range: Some((f64::NEG_INFINITY, 0.0)),
    },
    MetricMetadata {
        name: AKAIKE_INFORMATION_CRITERION,
        description: "Small-sample corrected Akaike information criterion",
        ordering: MetricOrdering::LowerIsBetter,
        range: None,
    },
];

/// Metadata for `name`, if it is a known metric.
pub fn metadata(name: &str) -> Option<&'static MetricMetadata> {
    METRIC_METADATA.iter().find(|m| m.name == name)
}
