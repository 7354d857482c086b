//! Numerical stability utilities.
//!
//! Provides safe implementations of the scalar link functions used by the
//! GLM losses and the evaluation engine. Naïve forms of `ln(1 + eˣ)` and
//! `1 / (1 + e⁻ˣ)` overflow or lose precision for large `|x|`; the guarded
//! versions here keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`LOG_LIKELIHOOD_EPSILON`]: clamp margin (1e-9) for Bernoulli
//!   log-likelihood terms.
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`, ℝ → (0, ∞).
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`, ℝ → (0, 1).
//! - [`clamp_probability(p)`]: clamp into `[ε, 1 − ε]`.

/// Probabilities are clamped into `[ε, 1 − ε]` before taking logs.
pub const LOG_LIKELIHOOD_EPSILON: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For `x > 20`, `softplus(x) = x + ln1p(exp(-x)) ≈ x` within `f64` precision.
/// - Otherwise `ln1p(exp(x))`, which is accurate for large negative `x`.
///
/// This is the logistic loss building block: `ln(1 + e^{-m})` for a positive
/// label is `safe_softplus(-m)`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x + (-x).exp().ln_1p() } else { x.exp().ln_1p() }
}

/// Numerically stable logistic sigmoid `σ(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments so neither branch can
/// overflow; the result is always in `[0, 1]`.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Clamp a probability into `[LOG_LIKELIHOOD_EPSILON, 1 − LOG_LIKELIHOOD_EPSILON]`.
#[inline]
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(LOG_LIKELIHOOD_EPSILON, 1.0 - LOG_LIKELIHOOD_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of stable transforms with naïve formulas on a safe grid.
    // - Tail behavior (no overflow, saturation to the right limits).
    // - Clamping bounds.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // On moderate inputs the guarded transforms equal the textbook formulas.
    fn transforms_match_naive_formulas_on_safe_grid() {
        for i in -10..=10 {
            let x = i as f64 * 1.5;
            assert_relative_eq!(safe_softplus(x), (1.0 + x.exp()).ln(), max_relative = 1e-12);
            assert_relative_eq!(safe_logistic(x), 1.0 / (1.0 + (-x).exp()), max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Extreme inputs neither overflow nor produce NaN, and the logistic
    // function satisfies σ(−x) = 1 − σ(x).
    fn transforms_are_stable_in_the_tails() {
        assert_eq!(safe_softplus(1000.0), 1000.0);
        assert!(safe_softplus(-1000.0) >= 0.0);
        assert_eq!(safe_logistic(1000.0), 1.0);
        assert_eq!(safe_logistic(-1000.0), 0.0);
        assert_relative_eq!(safe_logistic(-2.5), 1.0 - safe_logistic(2.5), epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Probabilities at or beyond the boundary are pulled inside by ε.
    fn clamp_probability_respects_epsilon() {
        assert_eq!(clamp_probability(0.0), LOG_LIKELIHOOD_EPSILON);
        assert_eq!(clamp_probability(1.0), 1.0 - LOG_LIKELIHOOD_EPSILON);
        assert_eq!(clamp_probability(0.3), 0.3);
    }
}
