//! data::errors — validation errors for labeled records and datasets.
//!
//! Purpose
//! -------
//! Describe every way a record or dataset can be rejected at construction time,
//! so that the optimizer and the evaluation engine can assume well-formed input
//! (non-empty, consistent feature dimension, finite labels and offsets).
//!
//! Conventions
//! -----------
//! - Variants carry the offending index/value and, where useful, a short
//!   `&'static str` reason, mirroring the optimizer error surface.
//! - Conversions into `OptError` and `EvalError` live next to those enums.

/// Result alias for data construction and validation.
pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// A dataset (or every partition of it) contains no records.
    EmptyDataset,

    /// A record's feature dimension differs from the dataset dimension.
    FeatureDimMismatch { record: usize, expected: usize, found: usize },

    /// A label is NaN or infinite.
    NonFiniteLabel { record: usize, value: f64 },

    /// An offset is NaN or infinite.
    NonFiniteOffset { record: usize, value: f64 },

    /// A feature value is NaN or infinite.
    NonFiniteFeature { index: usize, value: f64 },

    /// Sparse feature indices must be strictly increasing and below `dim`.
    InvalidSparseIndex { index: usize, dim: usize, reason: &'static str },

    /// Sparse index and value arrays differ in length.
    SparseLengthMismatch { indices: usize, values: usize },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptyDataset => write!(f, "Dataset contains no records"),
            DataError::FeatureDimMismatch { record, expected, found } => {
                write!(f, "Record {record} has {found} features, expected {expected}")
            }
            DataError::NonFiniteLabel { record, value } => {
                write!(f, "Record {record} has non-finite label {value}")
            }
            DataError::NonFiniteOffset { record, value } => {
                write!(f, "Record {record} has non-finite offset {value}")
            }
            DataError::NonFiniteFeature { index, value } => {
                write!(f, "Feature {index} has non-finite value {value}")
            }
            DataError::InvalidSparseIndex { index, dim, reason } => {
                write!(f, "Invalid sparse index {index} for dimension {dim}: {reason}")
            }
            DataError::SparseLengthMismatch { indices, values } => {
                write!(f, "Sparse vector has {indices} indices but {values} values")
            }
        }
    }
}
