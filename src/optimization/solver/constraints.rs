//! solver::constraints — per-feature box constraints.
//!
//! A [`ConstraintMap`] maps feature indices to closed intervals
//! `[lower, upper]`. Bounds may be infinite (one-sided constraints) but never
//! NaN, and `lower <= upper`. Coefficients are projected onto the box by
//! clamping, which is applied to the initial point and to every point a step
//! rule proposes before the objective is evaluated there.
//!
//! A coordinate is *active* when it sits on a bound and the gradient pushes
//! it outward. The projected gradient zeroes active coordinates (and any
//! coordinate outside its interval, where `f∘P` is flat), so its norm is the
//! first-order optimality measure on the box.
use std::collections::BTreeMap;

use crate::optimization::{
    errors::{OptError, OptResult},
    solver::types::{Grad, Theta},
};

/// Validated map `feature index -> (lower, upper)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintMap {
    bounds: BTreeMap<usize, (f64, f64)>,
}

impl ConstraintMap {
    /// Build a constraint map from `(index, (lower, upper))` pairs.
    ///
    /// Later pairs for the same index replace earlier ones.
    ///
    /// # Errors
    /// [`OptError::InvalidConstraint`] if a bound is NaN or `lower > upper`.
    pub fn new(bounds: impl IntoIterator<Item = (usize, (f64, f64))>) -> OptResult<Self> {
        let mut map = BTreeMap::new();
        for (index, (lower, upper)) in bounds {
            if lower.is_nan() || upper.is_nan() {
                return Err(OptError::InvalidConstraint {
                    index,
                    lower,
                    upper,
                    reason: "Bounds must not be NaN.",
                });
            }
            if lower > upper {
                return Err(OptError::InvalidConstraint {
                    index,
                    lower,
                    upper,
                    reason: "Lower bound must not exceed upper bound.",
                });
            }
            map.insert(index, (lower, upper));
        }
        Ok(Self { bounds: map })
    }

    /// Bounds for `index`, if constrained.
    pub fn bounds(&self, index: usize) -> Option<(f64, f64)> {
        self.bounds.get(&index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, (f64, f64))> + '_ {
        self.bounds.iter().map(|(&i, &b)| (i, b))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Check every constrained index against the coefficient dimension.
    ///
    /// # Errors
    /// [`OptError::ConstraintIndexOutOfRange`] for the smallest offending index.
    pub fn validate_dimension(&self, dim: usize) -> OptResult<()> {
        match self.bounds.keys().find(|&&index| index >= dim) {
            Some(&index) => Err(OptError::ConstraintIndexOutOfRange { index, dim }),
            None => Ok(()),
        }
    }

    /// Clamp constrained coordinates into their intervals.
    ///
    /// Indices must have been checked with [`validate_dimension`](Self::validate_dimension).
    pub fn project(&self, mut coefficients: Theta) -> Theta {
        for (&index, &(lower, upper)) in &self.bounds {
            if let Some(c) = coefficients.get_mut(index) {
                *c = c.clamp(lower, upper);
            }
        }
        coefficients
    }

    /// Gradient of `f∘P` at `coefficients`, given the gradient of `f` at the
    /// projected point: active or out-of-box coordinates become 0.
    pub fn project_gradient(&self, coefficients: &Theta, mut gradient: Grad) -> Grad {
        for (&index, &(lower, upper)) in &self.bounds {
            if let (Some(&c), Some(g)) = (coefficients.get(index), gradient.get_mut(index)) {
                if is_blocked(c, *g, lower, upper) {
                    *g = 0.0;
                }
            }
        }
        gradient
    }

    /// Zero the entries of `vector` on coordinates that are active at
    /// `coefficients`, where `gradient` is the projected gradient there.
    pub fn zero_active(&self, coefficients: &Theta, gradient: &Grad, vector: &mut Theta) {
        for (&index, &(lower, upper)) in &self.bounds {
            let (Some(&c), Some(&g)) = (coefficients.get(index), gradient.get(index)) else {
                continue;
            };
            if g == 0.0 && (c <= lower || c >= upper) {
                if let Some(v) = vector.get_mut(index) {
                    *v = 0.0;
                }
            }
        }
    }
}

fn is_blocked(c: f64, g: f64, lower: f64, upper: f64) -> bool {
    c < lower || c > upper || (c == lower && g > 0.0) || (c == upper && g < 0.0)
}
