//! function::objective — the capability the optimizer minimizes.
use crate::{
    data::Dataset,
    optimization::{
        errors::{OptError, OptResult},
        solver::types::{Cost, Grad, Theta},
    },
};

/// A differentiable objective over a dataset.
///
/// Required:
/// - `calculate(data, coefficients) -> (value, gradient)`: one pass over
///   `data`. The gradient must have the length of `coefficients`. A
///   non-finite value or gradient is not an error here; the optimizer
///   detects it and stops with `ObjectiveNotFinite`.
///
/// Optional:
/// - `hessian_vector(data, coefficients, direction) -> H·direction`: used by
///   TRON. When not implemented the optimizer falls back to finite
///   differences of the gradient.
pub trait ObjectiveFunction {
    fn calculate(&self, data: &Dataset, coefficients: &Theta) -> OptResult<(Cost, Grad)>;

    fn hessian_vector(
        &self, _data: &Dataset, _coefficients: &Theta, _direction: &Theta,
    ) -> OptResult<Grad> {
        Err(OptError::HessianVectorNotImplemented)
    }
}
