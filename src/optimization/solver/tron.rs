//! solver::tron — trust-region Newton step rule.
//!
//! Purpose
//! -------
//! Implement the TRON step (Lin & Moré trust-region Newton, as used for
//! large-scale logistic regression): approximately minimize the local
//! quadratic model inside a ball of radius `δ` with truncated conjugate
//! gradient, accept the step if the actual reduction is a large enough
//! fraction of the predicted one, and adapt `δ` either way.
//!
//! Key behaviors
//! -------------
//! - Truncated CG stops when the residual falls below `0.1·‖g‖`, when the
//!   iterate leaves the trust region (it is then pulled back onto the
//!   boundary), or after `max_cg_iterations`.
//! - Up to `max_improvement_failures` trial steps are attempted per
//!   iteration. If all are rejected the previous point is returned with
//!   the next iteration index.
//! - The radius starts at `‖g₀‖` and is capped by the first step length.
//! - Under box constraints CG runs on the free coordinates only (active
//!   ones are held at their bound), and the predicted reduction is taken
//!   along the projected step actually evaluated.
//!
//! Invariants & assumptions
//! ------------------------
//! - Hessian-vector products come from [`ObjectiveAdapter::hessian_vector`]
//!   (analytic, or finite differences of the gradient).
//! - The objective is convex along CG directions; a non-positive curvature
//!   direction is followed to the trust-region boundary.
use log::{debug, trace};
use ndarray::Array1;

use crate::{
    function::objective::ObjectiveFunction,
    optimization::{
        errors::{OptError, OptResult},
        solver::{
            adapter::ObjectiveAdapter,
            state::OptimizerState,
            step::StepRule,
            traits::TronOptions,
            types::{Grad, Theta},
        },
    },
};

/// Acceptance thresholds on `actual / predicted` reduction.
const ETA0: f64 = 1e-4;
const ETA1: f64 = 0.25;
const ETA2: f64 = 0.75;

/// Trust-radius update factors.
const SIGMA1: f64 = 0.25;
const SIGMA2: f64 = 0.5;
const SIGMA3: f64 = 4.0;

/// Relative residual tolerance of truncated CG.
const CG_TOLERANCE: f64 = 0.1;

/// Trust-region Newton step rule.
#[derive(Debug, Clone)]
pub struct TronStep {
    options: TronOptions,
    delta: Option<f64>,
}

impl TronStep {
    pub const NAME: &'static str = "TRON";

    pub fn new(options: TronOptions) -> Self {
        Self { options, delta: None }
    }

    pub fn options(&self) -> TronOptions {
        self.options
    }

    /// Current trust-region radius, `None` before `init`.
    pub fn trust_radius(&self) -> Option<f64> {
        self.delta
    }
}

impl StepRule for TronStep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init<F: ObjectiveFunction>(
        &mut self, _problem: &ObjectiveAdapter<'_, F>, initial: &OptimizerState,
    ) -> OptResult<()> {
        self.delta = Some(initial.gradient_norm());
        Ok(())
    }

    fn run_one_iteration<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState,
    ) -> OptResult<OptimizerState> {
        let mut delta = self.delta.ok_or(OptError::StepRuleNotInitialized { name: Self::NAME })?;
        let w = current.coefficients();
        let f = current.value();
        let g = current.gradient();
        let next_iteration = current.iteration() + 1;

        let mut failures = 0;
        let result = loop {
            let (cg_iterations, step, residual) =
                truncated_cg(problem, w, g, delta, self.options.max_cg_iterations)?;
            let trial = problem.calculate_state(w + &step, next_iteration)?;
            let (step, predicted) = if problem.is_constrained() {
                let projected = trial.coefficients() - w;
                let hs = problem.hessian_vector(w, &projected)?;
                let predicted = -(g.dot(&projected) + 0.5 * projected.dot(&hs));
                (projected, predicted)
            } else {
                let predicted = -0.5 * (g.dot(&step) - step.dot(&residual));
                (step, predicted)
            };
            let step_norm = step.dot(&step).sqrt();
            let gs = g.dot(&step);
            let actual = f - trial.value();

            if current.iteration() == 0 {
                delta = delta.min(step_norm);
            }

            if !trial.value().is_finite() {
                delta = SIGMA1 * delta.min(step_norm);
            } else {
                let curvature = trial.value() - f - gs;
                let alpha =
                    if curvature <= 0.0 { SIGMA3 } else { SIGMA1.max(-0.5 * (gs / curvature)) };
                delta = if actual < ETA0 * predicted {
                    (alpha.max(SIGMA1) * step_norm).min(SIGMA2 * delta)
                } else if actual < ETA1 * predicted {
                    (SIGMA1 * delta).max((alpha * step_norm).min(SIGMA2 * delta))
                } else if actual < ETA2 * predicted {
                    (SIGMA1 * delta).max((alpha * step_norm).min(SIGMA3 * delta))
                } else {
                    delta.max((alpha * step_norm).min(SIGMA3 * delta))
                };
            }
            trace!(
                "TRON trial: cg iterations {cg_iterations}, actual {actual:.4e}, predicted {predicted:.4e}, delta {delta:.4e}"
            );

            if trial.value().is_finite() && actual > ETA0 * predicted {
                break trial;
            }
            failures += 1;
            if failures >= self.options.max_improvement_failures {
                debug!("TRON rejected {failures} trial steps at iteration {next_iteration}");
                break current.advanced();
            }
        };
        self.delta = Some(delta);
        Ok(result)
    }

    fn clear_inner_state(&mut self) {
        self.delta = None;
    }
}

/// Truncated conjugate gradient on the trust-region subproblem
/// `min gᵀs + ½ sᵀHs` subject to `‖s‖ <= delta`.
///
/// Returns `(iterations, step, residual)` with `residual = −g − H·step`.
/// Products are restricted to the free coordinates at `w`.
fn truncated_cg<F: ObjectiveFunction>(
    problem: &ObjectiveAdapter<'_, F>, w: &Theta, g: &Grad, delta: f64, max_iterations: usize,
) -> OptResult<(usize, Theta, Theta)> {
    let mut step: Theta = Array1::zeros(w.len());
    let mut residual: Theta = -g;
    let mut direction = residual.clone();
    let mut rtr = residual.dot(&residual);
    let tolerance = CG_TOLERANCE * g.dot(g).sqrt();

    let mut iterations = 0;
    while iterations < max_iterations {
        if rtr.sqrt() <= tolerance {
            break;
        }
        iterations += 1;
        let mut hd = problem.hessian_vector(w, &direction)?;
        problem.zero_active(w, g, &mut hd);
        let dhd = direction.dot(&hd);
        let positive_curvature = dhd > 0.0;
        let alpha = if positive_curvature { rtr / dhd } else { 0.0 };
        let candidate = &step + &(&direction * alpha);
        if !positive_curvature || candidate.dot(&candidate).sqrt() > delta {
            let tau = boundary_step(&step, &direction, delta);
            step.scaled_add(tau, &direction);
            residual.scaled_add(-tau, &hd);
            break;
        }
        step = candidate;
        residual.scaled_add(-alpha, &hd);
        let rnew = residual.dot(&residual);
        let beta = rnew / rtr;
        direction = &residual + &(&direction * beta);
        rtr = rnew;
    }
    Ok((iterations, step, residual))
}

/// Largest `τ >= 0` with `‖s + τd‖ = delta`.
fn boundary_step(step: &Theta, direction: &Theta, delta: f64) -> f64 {
    let std = step.dot(direction);
    let sts = step.dot(step);
    let dtd = direction.dot(direction);
    let dsq = delta * delta;
    let rad = (std * std + dtd * (dsq - sts)).max(0.0).sqrt();
    if std >= 0.0 { (dsq - sts) / (std + rad) } else { (rad - std) / dtd }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Dataset, Features, LabeledPoint},
        optimization::solver::{
            adapter::EvaluationLedger, constraints::ConstraintMap, types::Cost,
        },
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    /// `f(w) = ½ (w − c)ᵀ A (w − c)` with analytic Hessian-vector product.
    struct Quadratic;

    impl Quadratic {
        fn a() -> ndarray::Array2<f64> {
            array![[3.0, 1.0], [1.0, 2.0]]
        }
        fn c() -> Theta {
            array![1.0, -1.0]
        }
    }

    impl ObjectiveFunction for Quadratic {
        fn calculate(&self, _data: &Dataset, w: &Theta) -> OptResult<(Cost, Grad)> {
            let diff = w - &Self::c();
            let ad = Self::a().dot(&diff);
            Ok((0.5 * diff.dot(&ad), ad))
        }

        fn hessian_vector(&self, _data: &Dataset, _w: &Theta, v: &Theta) -> OptResult<Grad> {
            Ok(Self::a().dot(v))
        }
    }

    fn data() -> Dataset {
        Dataset::local(vec![LabeledPoint::new(Features::dense(array![0.0, 0.0]).unwrap(), 0.0)])
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The boundary step lands exactly on the sphere of radius delta.
    fn boundary_step_reaches_radius() {
        let s = array![0.3, 0.0];
        let d = array![1.0, 1.0];
        let tau = boundary_step(&s, &d, 1.0);
        let end = &s + &(&d * tau);
        assert_relative_eq!(end.dot(&end).sqrt(), 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // With a large trust region, CG solves the 2-d quadratic model exactly
    // in two iterations, so one TRON step reaches the minimizer.
    //
    // Given
    // -----
    // - f(w) = ½ (w − c)ᵀA(w − c), w₀ = 0; first-iteration radius is ‖g₀‖,
    //   already larger than the Newton step here.
    //
    // Expect
    // ------
    // - After iterations, coefficients ≈ c and the iteration index is 1, 2, ...
    fn tron_converges_on_quadratic() {
        // Arrange
        let data = data();
        let ledger = EvaluationLedger::new();
        let problem = ObjectiveAdapter::new(&Quadratic, &data, None, &ledger);
        let mut step = TronStep::new(TronOptions::default());
        let mut state = problem.calculate_state(array![0.0, 0.0], 0).unwrap();
        step.init(&problem, &state).unwrap();

        // Act
        for expected in 1..=5 {
            state = step.run_one_iteration(&problem, &state).unwrap();
            assert_eq!(state.iteration(), expected);
        }

        // Assert
        assert_relative_eq!(state.coefficients()[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(state.coefficients()[1], -1.0, epsilon = 1e-6);
        assert!(ledger.hessian_vector_count() > 0);
    }

    #[test]
    // Purpose
    // -------
    // At the minimizer no trial step improves; after the allowed failures
    // the previous point comes back with the next iteration index.
    fn rejected_iteration_returns_previous_point() {
        let data = data();
        let ledger = EvaluationLedger::new();
        let problem = ObjectiveAdapter::new(&Quadratic, &data, None, &ledger);
        let mut step = TronStep::new(TronOptions::new(20, 2).unwrap());
        let start = problem.calculate_state(array![1.0 + 1e-3, -1.0], 3).unwrap();
        step.init(&problem, &start).unwrap();
        let optimum = problem.calculate_state(Quadratic::c(), 3).unwrap();

        let next = step.run_one_iteration(&problem, &optimum).unwrap();

        assert_eq!(next.coefficients(), optimum.coefficients());
        assert_eq!(next.iteration(), 4);
    }

    #[test]
    // Purpose
    // -------
    // With a box constraint cutting off the minimizer of a correlated
    // quadratic, TRON lands on the constrained minimizer: the clamped
    // coordinate sits on its bound and the free one solves the reduced
    // problem.
    //
    // Given
    // -----
    // - f(w) = ½ (w − c)ᵀA(w − c), A = [[3, 1], [1, 2]], c = (1, −1).
    // - Feature 0 in [−10, 0.5]; start at 0.
    //
    // Expect
    // ------
    // - w ≈ (0.5, −0.75), where ∂f/∂w₁ = 0 with w₀ fixed at 0.5, and the
    //   stored projected gradient vanishes.
    fn tron_reaches_constrained_minimizer() {
        // Arrange
        let data = data();
        let ledger = EvaluationLedger::new();
        let constraints = ConstraintMap::new([(0, (-10.0, 0.5))]).unwrap();
        let problem = ObjectiveAdapter::new(&Quadratic, &data, Some(&constraints), &ledger);
        let mut step = TronStep::new(TronOptions::default());
        let mut state = problem.calculate_state(array![0.0, 0.0], 0).unwrap();
        step.init(&problem, &state).unwrap();

        // Act
        for _ in 0..5 {
            state = step.run_one_iteration(&problem, &state).unwrap();
        }

        // Assert
        assert_relative_eq!(state.coefficients()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(state.coefficients()[1], -0.75, epsilon = 1e-6);
        assert!(state.gradient_norm() < 1e-6);
    }
}
