//! function::glm — L2-regularized GLM objectives over a [`Dataset`].
//!
//! Purpose
//! -------
//! Turn a [`PointwiseLoss`] into an [`ObjectiveFunction`]:
//!
//! `f(w) = Σᵢ ℓ(xᵢᵀw + oᵢ, yᵢ) + ½ λ ‖w‖²`
//!
//! with analytic gradient `Σᵢ ℓ'(mᵢ, yᵢ) xᵢ + λ w` and Hessian-vector
//! product `Σᵢ ℓ''(mᵢ, yᵢ) (xᵢᵀv) xᵢ + λ v`.
//!
//! Key behaviors
//! -------------
//! - Value and gradient come from a single [`Dataset::aggregate`] pass, so
//!   on partitioned data the coefficients are broadcast once per call.
//! - Offsets are part of the margin; they never receive a gradient.
use ndarray::Array1;

use crate::{
    data::Dataset,
    function::{
        loss::{LogisticLoss, PointwiseLoss, PoissonLoss, SquaredLoss},
        objective::ObjectiveFunction,
    },
    optimization::{
        errors::{OptError, OptResult},
        solver::types::{Cost, Grad, Theta},
    },
};

/// Sum of pointwise losses plus an optional L2 penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct GlmObjective<L: PointwiseLoss> {
    loss: L,
    l2_weight: f64,
}

impl<L: PointwiseLoss> GlmObjective<L> {
    /// # Errors
    /// [`OptError::InvalidRegularization`] if `l2_weight` is negative or
    /// non-finite.
    pub fn new(loss: L, l2_weight: f64) -> OptResult<Self> {
        if !l2_weight.is_finite() {
            return Err(OptError::InvalidRegularization {
                weight: l2_weight,
                reason: "Regularization weight must be finite.",
            });
        }
        if l2_weight < 0.0 {
            return Err(OptError::InvalidRegularization {
                weight: l2_weight,
                reason: "Regularization weight must be non-negative.",
            });
        }
        Ok(Self { loss, l2_weight })
    }

    /// Unregularized objective.
    pub fn unregularized(loss: L) -> Self {
        Self { loss, l2_weight: 0.0 }
    }

    pub fn loss(&self) -> &L {
        &self.loss
    }

    pub fn l2_weight(&self) -> f64 {
        self.l2_weight
    }
}

impl GlmObjective<LogisticLoss> {
    pub fn logistic(l2_weight: f64) -> OptResult<Self> {
        Self::new(LogisticLoss, l2_weight)
    }
}

impl GlmObjective<PoissonLoss> {
    pub fn poisson(l2_weight: f64) -> OptResult<Self> {
        Self::new(PoissonLoss, l2_weight)
    }
}

impl GlmObjective<SquaredLoss> {
    pub fn squared(l2_weight: f64) -> OptResult<Self> {
        Self::new(SquaredLoss, l2_weight)
    }
}

impl<L: PointwiseLoss> ObjectiveFunction for GlmObjective<L> {
    fn calculate(&self, data: &Dataset, coefficients: &Theta) -> OptResult<(Cost, Grad)> {
        let dim = data.num_features();
        if coefficients.len() != dim {
            return Err(OptError::CoefficientDimMismatch { expected: dim, found: coefficients.len() });
        }
        let loss = &self.loss;
        let (mut value, mut gradient) = data.aggregate(
            coefficients,
            || (0.0, Array1::<f64>::zeros(dim)),
            |(value, mut gradient), point, w| {
                let (l, d) = loss.loss_and_derivative(point.margin(w), point.label);
                point.features.axpy(d, &mut gradient);
                (value + l, gradient)
            },
            |(va, mut ga), (vb, gb)| {
                ga += &gb;
                (va + vb, ga)
            },
        );
        if self.l2_weight > 0.0 {
            value += 0.5 * self.l2_weight * coefficients.dot(coefficients);
            gradient.scaled_add(self.l2_weight, coefficients);
        }
        Ok((value, gradient))
    }

    fn hessian_vector(
        &self, data: &Dataset, coefficients: &Theta, direction: &Theta,
    ) -> OptResult<Grad> {
        let dim = data.num_features();
        if direction.len() != dim {
            return Err(OptError::GradientDimMismatch { expected: dim, found: direction.len() });
        }
        let loss = &self.loss;
        let mut product = data.aggregate(
            coefficients,
            || Array1::<f64>::zeros(dim),
            |mut acc, point, w| {
                let curvature = loss.second_derivative(point.margin(w), point.label);
                point.features.axpy(curvature * point.features.dot(direction), &mut acc);
                acc
            },
            |mut a, b| {
                a += &b;
                a
            },
        );
        if self.l2_weight > 0.0 {
            product.scaled_add(self.l2_weight, direction);
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Features, LabeledPoint, PartitionedDataset};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Value/gradient of the squared loss against hand-computed numbers.
    // - Gradient and Hessian-vector products against finite differences.
    // - Local vs partitioned agreement and regularization validation.
    // -------------------------------------------------------------------------

    fn records() -> Vec<LabeledPoint> {
        (0..12)
            .map(|i| {
                let x = i as f64 / 4.0 - 1.0;
                let label = if (i * 7) % 3 == 0 { 1.0 } else { 0.0 };
                LabeledPoint::with_offset(Features::dense(array![1.0, x, x * x]).unwrap(), label, 0.1)
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Squared loss on two records reproduces the textbook value and gradient.
    //
    // Given
    // -----
    // - x₁ = [1, 0], y₁ = 1; x₂ = [1, 2], y₂ = 0; w = [0.5, 0.5]; λ = 1.
    //
    // Expect
    // ------
    // - residuals r = [−0.5, 1.5]; value = ½(0.25 + 2.25) + ½·0.5 = 1.5.
    // - gradient = Σ rᵢ xᵢ + w = [1.0, 3.0] + [0.5, 0.5] = [1.5, 3.5].
    fn squared_loss_matches_hand_computation() {
        // Arrange
        let data = Dataset::local(vec![
            LabeledPoint::new(Features::dense(array![1.0, 0.0]).unwrap(), 1.0),
            LabeledPoint::new(Features::dense(array![1.0, 2.0]).unwrap(), 0.0),
        ])
        .unwrap();
        let objective = GlmObjective::squared(1.0).unwrap();

        // Act
        let (value, gradient) = objective.calculate(&data, &array![0.5, 0.5]).unwrap();

        // Assert
        assert_relative_eq!(value, 1.5);
        assert_relative_eq!(gradient[0], 1.5);
        assert_relative_eq!(gradient[1], 3.5);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient and Hessian-vector product of the logistic
    // objective agree with central differences.
    fn logistic_derivatives_match_finite_differences() {
        // Arrange
        let data = Dataset::local(records()).unwrap();
        let objective = GlmObjective::logistic(0.3).unwrap();
        let w = array![0.2, -0.4, 0.7];
        let v = array![1.0, 0.5, -0.25];
        let h = 1e-6;

        // Act
        let (_, gradient) = objective.calculate(&data, &w).unwrap();
        let hv = objective.hessian_vector(&data, &w, &v).unwrap();
        let (_, g_plus) = objective.calculate(&data, &(&w + &(&v * h))).unwrap();
        let (_, g_minus) = objective.calculate(&data, &(&w - &(&v * h))).unwrap();

        // Assert
        for j in 0..3 {
            let mut e = Array1::zeros(3);
            e[j] = h;
            let (fp, _) = objective.calculate(&data, &(&w + &e)).unwrap();
            let (fm, _) = objective.calculate(&data, &(&w - &e)).unwrap();
            assert_relative_eq!(gradient[j], (fp - fm) / (2.0 * h), epsilon = 1e-5);
        }
        let fd_hv = (&g_plus - &g_minus) / (2.0 * h);
        for (a, b) in hv.iter().zip(fd_hv.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // Local and partitioned datasets yield the same value and gradient, and
    // invalid regularization weights are rejected.
    fn partitioned_and_local_agree() {
        let local = Dataset::local(records()).unwrap();
        let distributed = Dataset::Distributed(PartitionedDataset::from_records(records(), 5).unwrap());
        let objective = GlmObjective::poisson(0.0).unwrap();
        let w = array![0.1, 0.2, -0.3];

        let (vl, gl) = objective.calculate(&local, &w).unwrap();
        let (vd, gd) = objective.calculate(&distributed, &w).unwrap();

        assert_relative_eq!(vl, vd, epsilon = 1e-12);
        for (a, b) in gl.iter().zip(gd.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_eq!(distributed.broadcasts().unwrap().live(), 0);
        assert!(matches!(GlmObjective::squared(-1.0), Err(OptError::InvalidRegularization { .. })));
    }
}
