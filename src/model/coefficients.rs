//! model::coefficients — fitted coefficient means and optional variances.
use ndarray::Array1;

use crate::optimization::errors::{OptError, OptResult};

/// Magnitude above which a coefficient counts as an effective parameter.
pub const EFFECTIVE_PARAMETER_TOLERANCE: f64 = 1e-9;

/// Coefficient means with optional per-coefficient variances.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    means: Array1<f64>,
    variances: Option<Array1<f64>>,
}

impl Coefficients {
    pub fn new(means: Array1<f64>) -> Self {
        Self { means, variances: None }
    }

    /// # Errors
    /// [`OptError::CoefficientDimMismatch`] if the arrays differ in length.
    pub fn with_variances(means: Array1<f64>, variances: Array1<f64>) -> OptResult<Self> {
        if means.len() != variances.len() {
            return Err(OptError::CoefficientDimMismatch {
                expected: means.len(),
                found: variances.len(),
            });
        }
        Ok(Self { means, variances: Some(variances) })
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn variances(&self) -> Option<&Array1<f64>> {
        self.variances.as_ref()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Number of means with `|w| > tolerance`.
    ///
    /// Sparsity-aware replacement for the raw dimension in information
    /// criteria: coefficients driven to (numerical) zero do not count.
    pub fn effective_parameter_count(&self, tolerance: f64) -> usize {
        self.means.iter().filter(|w| w.abs() > tolerance).count()
    }
}

impl From<Array1<f64>> for Coefficients {
    fn from(means: Array1<f64>) -> Self {
        Self::new(means)
    }
}
