//! evaluation::errors — failures of the metric engine.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for model evaluation and model
//! selection. Unsupported model/metric combinations are *not* errors (the
//! metric subset is skipped); these variants cover input that makes a
//! requested metric meaningless or a computation that broke down.
//!
//! Invariants & assumptions
//! ------------------------
//! - A non-finite margin or score, or a non-finite per-record
//!   log-likelihood after probability clamping, indicates corrupted
//!   coefficients; evaluation stops instead of emitting a poisoned metric.
//! - Classifier metrics need both classes present.
//!
//! Testing notes
//! -------------
//! - Unit tests here check that `Display` embeds the payload; the metric
//!   modules exercise the variants through evaluation.
use crate::data::errors::DataError;

pub type EvalResult<T> = Result<T, EvalError>;

/// Error conditions for evaluation and model selection.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A record's margin or mean-function score was NaN or infinite.
    NonFiniteScore { score: f64, margin: f64 },

    /// A per-record log-likelihood term was NaN or infinite.
    NonFiniteLogLikelihood { score: f64, label: f64, value: f64 },

    /// Binary-classification metrics on labels of a single class.
    DegenerateLabels { positives: usize, negatives: usize },

    /// Model coefficients and dataset features disagree in dimension.
    CoefficientDimMismatch { expected: usize, found: usize },

    /// A metric name absent from the metadata table.
    UnknownMetric { name: String },

    /// Model selection over evaluations that all lack the requested metric.
    MissingMetric { name: String },

    /// Model selection over an empty candidate list.
    NoCandidates,

    /// The dataset failed validation.
    InvalidData(DataError),
}

impl std::error::Error for EvalError {}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::NonFiniteScore { score, margin } => {
                write!(f, "Non-finite score {score} for margin {margin}")
            }
            EvalError::NonFiniteLogLikelihood { score, label, value } => write!(
                f,
                "Non-finite log-likelihood {value} for score {score} and label {label}"
            ),
            EvalError::DegenerateLabels { positives, negatives } => write!(
                f,
                "Binary metrics need both classes: {positives} positive, {negatives} negative labels"
            ),
            EvalError::CoefficientDimMismatch { expected, found } => {
                write!(f, "Model has {found} coefficients, dataset has {expected} features")
            }
            EvalError::UnknownMetric { name } => write!(f, "Unknown metric '{name}'"),
            EvalError::MissingMetric { name } => {
                write!(f, "No candidate evaluation contains metric '{name}'")
            }
            EvalError::NoCandidates => write!(f, "No candidate models to select from"),
            EvalError::InvalidData(err) => write!(f, "Invalid data: {err}"),
        }
    }
}

impl From<DataError> for EvalError {
    fn from(err: DataError) -> Self {
        EvalError::InvalidData(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Messages embed the offending payload.
    fn display_embeds_payload() {
        let degenerate = EvalError::DegenerateLabels { positives: 0, negatives: 4 };
        assert!(degenerate.to_string().contains("0 positive"));
        let unknown = EvalError::UnknownMetric { name: "Accuracy".to_string() };
        assert!(unknown.to_string().contains("Accuracy"));
        let data: EvalError = DataError::EmptyDataset.into();
        assert!(data.to_string().contains("no records"));
        let score = EvalError::NonFiniteScore { score: f64::INFINITY, margin: 800.0 };
        assert!(score.to_string().contains("inf") && score.to_string().contains("800"));
    }
}
