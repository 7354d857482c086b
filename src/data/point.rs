//! data::point — feature vectors and labeled records.
//!
//! Purpose
//! -------
//! Represent a single training/evaluation record: a dense or sparse feature
//! vector, a real label, and an additive offset on the margin scale. Records
//! are immutable once built and are only ever read by the optimizer and the
//! evaluation engine.
//!
//! Key behaviors
//! -------------
//! - [`Features`] supports the two linear-algebra operations every GLM pass
//!   needs: `dot` against a dense coefficient vector and `axpy` into a dense
//!   accumulator.
//! - [`LabeledPoint::margin`] computes `xᵀw + offset`, the quantity every
//!   pointwise loss and mean function is expressed in.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sparse indices are strictly increasing and `< dim`; values are finite.
//! - Dense features are finite.
//! - Dimension agreement between a record and a coefficient vector is checked
//!   once at dataset construction; the hot-path methods here do not re-check.
use ndarray::Array1;

use crate::data::errors::{DataError, DataResult};

/// Feature vector of a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Features {
    Dense(Array1<f64>),
    Sparse(SparseVector),
}

/// Compressed sparse vector with strictly increasing indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build a validated sparse vector.
    ///
    /// # Errors
    /// - [`DataError::SparseLengthMismatch`] if `indices` and `values` differ in length.
    /// - [`DataError::InvalidSparseIndex`] for an index `>= dim` or out of order.
    /// - [`DataError::NonFiniteFeature`] for a NaN/∞ value.
    pub fn new(dim: usize, indices: Vec<usize>, values: Vec<f64>) -> DataResult<Self> {
        if indices.len() != values.len() {
            return Err(DataError::SparseLengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        let mut last: Option<usize> = None;
        for (&index, &value) in indices.iter().zip(values.iter()) {
            if index >= dim {
                return Err(DataError::InvalidSparseIndex {
                    index,
                    dim,
                    reason: "Index must be smaller than the vector dimension.",
                });
            }
            if last.is_some_and(|prev| index <= prev) {
                return Err(DataError::InvalidSparseIndex {
                    index,
                    dim,
                    reason: "Indices must be strictly increasing.",
                });
            }
            if !value.is_finite() {
                return Err(DataError::NonFiniteFeature { index, value });
            }
            last = Some(index);
        }
        Ok(Self { dim, indices, values })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Features {
    /// Dense features from anything convertible into an `Array1<f64>`.
    ///
    /// # Errors
    /// [`DataError::NonFiniteFeature`] for the first NaN/∞ entry.
    pub fn dense(values: impl Into<Array1<f64>>) -> DataResult<Self> {
        let values = values.into();
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DataError::NonFiniteFeature { index, value });
        }
        Ok(Features::Dense(values))
    }

    /// Sparse features; see [`SparseVector::new`].
    pub fn sparse(dim: usize, indices: Vec<usize>, values: Vec<f64>) -> DataResult<Self> {
        Ok(Features::Sparse(SparseVector::new(dim, indices, values)?))
    }

    /// Number of features (the full dimension, not the number of non-zeros).
    pub fn dim(&self) -> usize {
        match self {
            Features::Dense(v) => v.len(),
            Features::Sparse(s) => s.dim,
        }
    }

    /// `xᵀw`.
    #[inline]
    pub fn dot(&self, w: &Array1<f64>) -> f64 {
        match self {
            Features::Dense(v) => v.dot(w),
            Features::Sparse(s) => s.indices.iter().zip(s.values.iter()).map(|(&i, &x)| x * w[i]).sum(),
        }
    }

    /// `acc += alpha · x`.
    #[inline]
    pub fn axpy(&self, alpha: f64, acc: &mut Array1<f64>) {
        match self {
            Features::Dense(v) => acc.scaled_add(alpha, v),
            Features::Sparse(s) => {
                for (&i, &x) in s.indices.iter().zip(s.values.iter()) {
                    acc[i] += alpha * x;
                }
            }
        }
    }
}

/// One record: features, label, and margin offset.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub features: Features,
    pub label: f64,
    pub offset: f64,
}

impl LabeledPoint {
    /// Record without an offset.
    pub fn new(features: Features, label: f64) -> Self {
        Self { features, label, offset: 0.0 }
    }

    /// Record with an explicit margin offset.
    pub fn with_offset(features: Features, label: f64, offset: f64) -> Self {
        Self { features, label, offset }
    }

    /// Margin `xᵀw + offset`.
    #[inline]
    pub fn margin(&self, w: &Array1<f64>) -> f64 {
        self.features.dot(w) + self.offset
    }
}
