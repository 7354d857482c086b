//! function::loss — pointwise GLM losses on the margin scale.
//!
//! Every loss is a function of the margin `m = xᵀw + offset` and the label
//! `y`, and exposes its value, first derivative, and second derivative with
//! respect to `m`. These are exactly the negative log-likelihoods (up to
//! label-only constants) of the three canonical GLM families.
use crate::optimization::numerical_stability::{safe_logistic, safe_softplus};

/// Loss `ℓ(m, y)` with derivatives in the margin.
pub trait PointwiseLoss: Sync + Send {
    /// `(ℓ(m, y), ∂ℓ/∂m)`.
    fn loss_and_derivative(&self, margin: f64, label: f64) -> (f64, f64);

    /// `∂²ℓ/∂m²`.
    fn second_derivative(&self, margin: f64, label: f64) -> f64;
}

/// Bernoulli negative log-likelihood; labels `> 0.5` are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogisticLoss;

/// Poisson negative log-likelihood without the `lnΓ(1 + y)` term.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoissonLoss;

/// Half squared error `½(m − y)²`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SquaredLoss;

impl PointwiseLoss for LogisticLoss {
    fn loss_and_derivative(&self, margin: f64, label: f64) -> (f64, f64) {
        let p = safe_logistic(margin);
        if label > 0.5 { (safe_softplus(-margin), p - 1.0) } else { (safe_softplus(margin), p) }
    }

    fn second_derivative(&self, margin: f64, _label: f64) -> f64 {
        let p = safe_logistic(margin);
        p * (1.0 - p)
    }
}

impl PointwiseLoss for PoissonLoss {
    fn loss_and_derivative(&self, margin: f64, label: f64) -> (f64, f64) {
        let mean = margin.exp();
        (mean - label * margin, mean - label)
    }

    fn second_derivative(&self, margin: f64, _label: f64) -> f64 {
        margin.exp()
    }
}

impl PointwiseLoss for SquaredLoss {
    fn loss_and_derivative(&self, margin: f64, label: f64) -> (f64, f64) {
        let residual = margin - label;
        (0.5 * residual * residual, residual)
    }

    fn second_derivative(&self, _margin: f64, _label: f64) -> f64 {
        1.0
    }
}
