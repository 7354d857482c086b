//! solver::state — immutable snapshot of one optimizer iteration.
use argmin_math::ArgminL2Norm;

use crate::optimization::solver::types::{Cost, Grad, Theta};

/// Coefficients, objective value, gradient, and iteration index.
///
/// States are never mutated; every accepted step produces a new one. The
/// iteration index of a state produced by a step is exactly one more than
/// the index of the state it started from.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerState {
    coefficients: Theta,
    value: Cost,
    gradient: Grad,
    iteration: usize,
}

impl OptimizerState {
    pub fn new(coefficients: Theta, value: Cost, gradient: Grad, iteration: usize) -> Self {
        Self { coefficients, value, gradient, iteration }
    }

    pub fn coefficients(&self) -> &Theta {
        &self.coefficients
    }

    pub fn value(&self) -> Cost {
        self.value
    }

    pub fn gradient(&self) -> &Grad {
        &self.gradient
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Euclidean norm of the gradient.
    pub fn gradient_norm(&self) -> f64 {
        self.gradient.l2_norm()
    }

    /// `true` when the value and every gradient entry are finite.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.gradient.iter().all(|g| g.is_finite())
    }

    /// Same point, relabelled with a later iteration index.
    ///
    /// Used by step rules that reject every trial step of an iteration.
    pub fn advanced(&self) -> Self {
        Self { iteration: self.iteration + 1, ..self.clone() }
    }

    pub fn into_coefficients(self) -> Theta {
        self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `advanced` keeps the point and bumps the iteration; finiteness looks at
    // both the value and the gradient.
    fn advanced_state_keeps_point_and_bumps_iteration() {
        let state = OptimizerState::new(array![1.0, 2.0], 3.0, array![3.0, 4.0], 4);
        let next = state.advanced();

        assert_eq!(next.iteration(), 5);
        assert_eq!(next.coefficients(), state.coefficients());
        assert_eq!(state.gradient_norm(), 5.0);
        assert!(state.is_finite());
        assert!(!OptimizerState::new(array![0.0], 1.0, array![f64::NAN], 0).is_finite());
    }
}
