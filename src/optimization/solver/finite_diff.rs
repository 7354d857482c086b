//! solver::finite_diff — Hessian-vector products from gradient differences.
//!
//! Purpose
//! -------
//! Give TRON a Hessian-vector product for objectives that only provide a
//! gradient: `H·v ≈ (∇f(w + h·v) − ∇f(w)) / h`, computed with
//! `finitediff::FiniteDiff::forward_hessian_vec_prod`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient closure cannot return `Result`, so the first error it hits
//!   is stored in a `RefCell` and `NaN`s are returned; after differencing
//!   the captured error is surfaced as a real `Err`.
//! - The returned product passes [`validate_grad`].
use std::cell::RefCell;

use finitediff::FiniteDiff;

use crate::optimization::{
    errors::{OptError, OptResult},
    solver::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};

/// Forward-difference Hessian-vector product of `gradient` at `theta`.
///
/// Parameters
/// ----------
/// - `theta`: point at which the Hessian is taken.
/// - `direction`: vector the Hessian is applied to.
/// - `gradient`: fallible gradient of the objective.
///
/// Errors
/// ------
/// - Any error returned by `gradient` during differencing.
/// - [`OptError::InvalidGradient`] / [`OptError::GradientDimMismatch`] if
///   the product is non-finite or mis-shaped.
pub fn hessian_vector_fd<G>(theta: &Theta, direction: &Theta, gradient: G) -> OptResult<Grad>
where
    G: Fn(&Theta) -> OptResult<Grad>,
{
    let dim = theta.len();
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let grad_func = |x: &Theta| -> Grad {
        match gradient(x) {
            Ok(g) => g,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                Grad::from_elem(dim, f64::NAN)
            }
        }
    };
    let product = theta.forward_hessian_vec_prod(&grad_func, direction);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&product, dim)?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // For a quadratic `½ wᵀAw` the product equals `A·v` up to FD error.
    //
    // Given
    // -----
    // - A = [[2, 1], [1, 3]], v = [1, −1].
    //
    // Expect
    // ------
    // - H·v ≈ [1, −2].
    fn quadratic_hessian_vector_matches_matrix_product() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let gradient = |w: &Theta| -> OptResult<Grad> { Ok(a.dot(w)) };

        let hv = hessian_vector_fd(&array![0.3, -0.2], &array![1.0, -1.0], gradient).unwrap();

        assert_relative_eq!(hv[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(hv[1], -2.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // An error raised inside the gradient closure is returned unchanged.
    fn gradient_errors_are_propagated() {
        let gradient = |_: &Theta| -> OptResult<Grad> { Err(OptError::NonFiniteObjective { value: f64::NAN }) };
        let result = hessian_vector_fd(&array![0.0], &array![1.0], gradient);
        assert!(matches!(result, Err(OptError::NonFiniteObjective { .. })));
    }
}
