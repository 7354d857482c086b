//! Validation helpers for the optimizer.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   relative tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Coefficient validation**: [`validate_coefficients`] checks a
//!   caller-supplied starting point against the data dimension.
use crate::optimization::{
    errors::{OptError, OptResult},
    solver::types::{Grad, Theta},
};

/// Validate the optional relative gradient tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional relative objective-change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Check that starting coefficients match the feature dimension.
///
/// # Errors
/// [`OptError::CoefficientDimMismatch`] on a length mismatch.
pub fn validate_coefficients(coefficients: &Theta, dim: usize) -> OptResult<()> {
    if coefficients.len() != dim {
        return Err(OptError::CoefficientDimMismatch { expected: dim, found: coefficients.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Tolerances must be finite and strictly positive; `None` always passes.
    fn tolerance_checks_reject_non_positive_and_non_finite() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-7)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // `validate_grad` reports the first non-finite entry and shape errors;
    // `validate_coefficients` reports dimension mismatches.
    fn gradient_and_coefficient_checks_report_offenders() {
        assert!(validate_grad(&array![1.0, 2.0], 2).is_ok());
        assert_eq!(
            validate_grad(&array![1.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        );
        assert!(matches!(
            validate_grad(&array![1.0, f64::INFINITY], 2),
            Err(OptError::InvalidGradient { index: 1, .. })
        ));
        assert_eq!(
            validate_coefficients(&array![0.0, 0.0, 0.0], 2),
            Err(OptError::CoefficientDimMismatch { expected: 2, found: 3 })
        );
    }
}
