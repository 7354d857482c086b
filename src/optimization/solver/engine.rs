//! solver::engine — the optimizer state machine.
//!
//! Purpose
//! -------
//! Drive a [`StepRule`] from a starting point to termination: build and
//! evaluate the initial state, iterate, check convergence after every
//! step, track states, and report why the solve stopped.
//!
//! Key behaviors
//! -------------
//! - [`Optimizer::optimize`] is the only entry point. Each call clears the
//!   step rule's inner state, starts a fresh tracker, and resets the
//!   current/previous states.
//! - Convergence is checked in priority order after every step:
//!   non-finite value or gradient, iteration cap, unchanged coefficients,
//!   relative objective change, relative gradient norm. Both relative
//!   tests use the *stored* initial state as reference.
//! - With `reuse_previous_initial_state`, the first solve's initial state
//!   stays the convergence reference for later solves (e.g. warm-started
//!   refits on reordered data).
//!
//! Invariants & assumptions
//! ------------------------
//! - Tracked iteration indices are contiguous from 0.
//! - Constraint indices are checked against the data dimension before the
//!   objective is evaluated for the first time.
//! - A non-finite termination returns `Err(NonFiniteObjective)` and leaves
//!   the sealed tracker readable through [`Optimizer::states_tracker`].
use log::{Level, info, log};

use crate::{
    data::Dataset,
    function::objective::ObjectiveFunction,
    optimization::{
        errors::{OptError, OptResult},
        solver::{
            adapter::{EvaluationLedger, ObjectiveAdapter},
            builders::build_step_rule,
            constraints::ConstraintMap,
            state::OptimizerState,
            step::{AnyStepRule, StepRule},
            tracker::{ConvergenceReason, OptimizationStatesTracker},
            traits::{OptimizerConfig, Tolerances},
            types::{Cost, FnEvalMap, Theta},
            validation::validate_coefficients,
        },
    },
};

/// Lifecycle of an [`Optimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerStatus {
    BeforeInit,
    Initialized,
    Iterating,
    Converged,
    MaxIterationsReached,
    Failed,
}

/// Iterative minimizer over a [`Dataset`].
#[derive(Debug)]
pub struct Optimizer<S: StepRule = AnyStepRule> {
    step_rule: S,
    tols: Tolerances,
    constraints: Option<ConstraintMap>,
    track_states: bool,
    reuse_previous_initial_state: bool,
    verbose: bool,
    status: OptimizerStatus,
    initial_state: Option<OptimizerState>,
    current_state: Option<OptimizerState>,
    previous_state: Option<OptimizerState>,
    tracker: OptimizationStatesTracker,
    fn_evals: FnEvalMap,
}

impl Optimizer<AnyStepRule> {
    /// Optimizer with the step rule named by `config.optimizer_type`.
    pub fn new(config: OptimizerConfig) -> Self {
        let step_rule = build_step_rule(&config);
        Self::with_step_rule(step_rule, config)
    }
}

impl<S: StepRule> Optimizer<S> {
    /// Optimizer with a caller-supplied step rule; the config's
    /// `optimizer_type` and solver-specific fields are ignored.
    pub fn with_step_rule(step_rule: S, config: OptimizerConfig) -> Self {
        Self {
            step_rule,
            tols: config.tols,
            constraints: config.constraints,
            track_states: config.track_states,
            reuse_previous_initial_state: config.reuse_previous_initial_state,
            verbose: config.verbose,
            status: OptimizerStatus::BeforeInit,
            initial_state: None,
            current_state: None,
            previous_state: None,
            tracker: OptimizationStatesTracker::new(config.track_states),
            fn_evals: FnEvalMap::new(),
        }
    }

    /// Minimize `objective` over `data`.
    ///
    /// Parameters
    /// ----------
    /// - `objective`: value/gradient (and optionally Hessian-vector) oracle.
    /// - `data`: local or partitioned dataset.
    /// - `initial_coefficients`: starting point; zeros of
    ///   `data.num_features()` when `None`. Projected onto the constraint
    ///   box before the first evaluation.
    ///
    /// Returns
    /// -------
    /// `(coefficients, value)` of the final state.
    ///
    /// Errors
    /// ------
    /// - [`OptError::ConstraintIndexOutOfRange`] /
    ///   [`OptError::CoefficientDimMismatch`] before any evaluation.
    /// - [`OptError::NonFiniteObjective`] if the solve ended with
    ///   `ObjectiveNotFinite`.
    /// - Any error raised by the objective or the step rule; the status is
    ///   then `Failed`.
    pub fn optimize<F: ObjectiveFunction>(
        &mut self, objective: &F, data: &Dataset, initial_coefficients: Option<Theta>,
    ) -> OptResult<(Theta, Cost)> {
        self.step_rule.clear_inner_state();
        self.tracker = OptimizationStatesTracker::new(self.track_states);
        self.current_state = None;
        self.previous_state = None;
        self.status = OptimizerStatus::BeforeInit;
        self.fn_evals = FnEvalMap::new();

        let dim = data.num_features();
        if let Some(constraints) = &self.constraints {
            constraints.validate_dimension(dim)?;
        }
        let coefficients = match initial_coefficients {
            Some(c) => {
                validate_coefficients(&c, dim)?;
                c
            }
            None => Theta::zeros(dim),
        };

        let constraints = self.constraints.clone();
        let ledger = EvaluationLedger::new();
        let problem = ObjectiveAdapter::new(objective, data, constraints.as_ref(), &ledger);
        let result = self.run(&problem, coefficients);
        self.fn_evals = ledger.counts();
        if result.is_err() {
            self.status = OptimizerStatus::Failed;
        }
        result
    }

    fn run<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, coefficients: Theta,
    ) -> OptResult<(Theta, Cost)> {
        let initial = problem.calculate_state(coefficients, 0)?;
        if !self.reuse_previous_initial_state || self.initial_state.is_none() {
            self.initial_state = Some(initial.clone());
        }
        let reference = self.initial_state.clone().unwrap_or_else(|| initial.clone());
        self.tracker.append(&initial);
        self.current_state = Some(initial.clone());
        self.status = OptimizerStatus::Initialized;
        self.log_state(&initial);

        if !initial.is_finite() {
            return self.finish(ConvergenceReason::ObjectiveNotFinite, initial);
        }
        if initial.gradient().iter().all(|&g| g == 0.0) {
            return self.finish(ConvergenceReason::GradientConverged, initial);
        }

        self.step_rule.init(problem, &initial)?;
        self.status = OptimizerStatus::Iterating;

        let mut current = initial;
        loop {
            let next = self.step_rule.run_one_iteration(problem, &current)?;
            self.tracker.append(&next);
            self.log_state(&next);
            let previous = std::mem::replace(&mut current, next);
            let reason = self.convergence_reason(&reference, &previous, &current);
            self.previous_state = Some(previous);
            self.current_state = Some(current.clone());
            if let Some(reason) = reason {
                return self.finish(reason, current);
            }
        }
    }

    fn convergence_reason(
        &self, reference: &OptimizerState, previous: &OptimizerState, current: &OptimizerState,
    ) -> Option<ConvergenceReason> {
        if !current.is_finite() {
            return Some(ConvergenceReason::ObjectiveNotFinite);
        }
        if current.iteration() >= self.tols.max_iter {
            return Some(ConvergenceReason::MaxIterations);
        }
        if current.coefficients() == previous.coefficients() {
            return Some(ConvergenceReason::ObjectiveNotImproving);
        }
        if let Some(tol) = self.tols.tol_cost {
            if (current.value() - previous.value()).abs() <= tol * reference.value().abs() {
                return Some(ConvergenceReason::FunctionValuesConverged);
            }
        }
        if let Some(tol) = self.tols.tol_grad {
            if current.gradient_norm() <= tol * reference.gradient_norm() {
                return Some(ConvergenceReason::GradientConverged);
            }
        }
        None
    }

    fn finish(
        &mut self, reason: ConvergenceReason, final_state: OptimizerState,
    ) -> OptResult<(Theta, Cost)> {
        self.tracker.seal(reason);
        self.status = match reason {
            ConvergenceReason::ObjectiveNotFinite => OptimizerStatus::Failed,
            ConvergenceReason::MaxIterations => OptimizerStatus::MaxIterationsReached,
            _ => OptimizerStatus::Converged,
        };
        info!(
            "{} finished after {} iterations: {reason} (value = {:.10e}, |gradient| = {:.6e})",
            self.step_rule.name(),
            final_state.iteration(),
            final_state.value(),
            final_state.gradient_norm()
        );
        if reason == ConvergenceReason::ObjectiveNotFinite {
            return Err(OptError::NonFiniteObjective { value: final_state.value() });
        }
        let value = final_state.value();
        Ok((final_state.into_coefficients(), value))
    }

    fn log_state(&self, state: &OptimizerState) {
        let level = if self.verbose { Level::Info } else { Level::Debug };
        log!(
            level,
            "{} iteration {}: value = {:.10e}, |gradient| = {:.6e}",
            self.step_rule.name(),
            state.iteration(),
            state.value(),
            state.gradient_norm()
        );
    }

    pub fn status(&self) -> OptimizerStatus {
        self.status
    }

    /// History and termination reason of the latest solve.
    pub fn states_tracker(&self) -> &OptimizationStatesTracker {
        &self.tracker
    }

    /// Convergence reference state (possibly from an earlier solve).
    pub fn initial_state(&self) -> Option<&OptimizerState> {
        self.initial_state.as_ref()
    }

    pub fn current_state(&self) -> Option<&OptimizerState> {
        self.current_state.as_ref()
    }

    pub fn previous_state(&self) -> Option<&OptimizerState> {
        self.previous_state.as_ref()
    }

    /// Evaluation counters of the latest solve.
    pub fn fn_evals(&self) -> &FnEvalMap {
        &self.fn_evals
    }

    pub fn step_rule(&self) -> &S {
        &self.step_rule
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tols
    }

    pub fn constraints(&self) -> Option<&ConstraintMap> {
        self.constraints.as_ref()
    }

    pub fn is_reusing_previous_initial_state(&self) -> bool {
        self.reuse_previous_initial_state
    }

    pub fn set_reuse_previous_initial_state(&mut self, reuse: bool) {
        self.reuse_previous_initial_state = reuse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Features, LabeledPoint},
        function::glm::GlmObjective,
        optimization::solver::types::Grad,
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Termination reasons and the resulting status.
    // - Initial-state edge cases (zero gradient, non-finite objective).
    // - Constraint and dimension checks before evaluation.
    // - Reuse of the stored initial state across solves.
    // -------------------------------------------------------------------------

    fn regression_data() -> Dataset {
        let records = (0..20)
            .map(|i| {
                let x = i as f64 / 10.0 - 1.0;
                LabeledPoint::new(Features::dense(array![1.0, x]).unwrap(), 0.5 - 2.0 * x)
            })
            .collect();
        Dataset::local(records).unwrap()
    }

    /// Finite only at the origin.
    struct ExplodesAwayFromZero;

    impl ObjectiveFunction for ExplodesAwayFromZero {
        fn calculate(&self, _data: &Dataset, w: &Theta) -> OptResult<(Cost, Grad)> {
            if w.iter().all(|&c| c == 0.0) {
                Ok((1.0, Grad::from_elem(w.len(), 1.0)))
            } else {
                Ok((f64::NAN, Grad::from_elem(w.len(), f64::NAN)))
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Least squares with L-BFGS converges to the generating coefficients with
    // contiguous tracked iterations and a converged status.
    //
    // Given
    // -----
    // - y = 0.5 − 2x exactly, features [1, x], gradient tolerance 1e-9.
    //
    // Expect
    // ------
    // - w ≈ [0.5, −2], status `Converged`, iterations 0..=k.
    fn lbfgs_solves_least_squares() {
        // Arrange
        let data = regression_data();
        let objective = GlmObjective::squared(0.0).unwrap();
        let tols = Tolerances::new(Some(1e-9), None, 100).unwrap();
        let mut optimizer = Optimizer::new(OptimizerConfig::lbfgs().with_tolerances(tols));

        // Act
        let (w, value) = optimizer.optimize(&objective, &data, None).unwrap();

        // Assert
        assert!((w[0] - 0.5).abs() < 1e-6 && (w[1] + 2.0).abs() < 1e-6, "w = {w}");
        assert!(value < 1e-10);
        assert_eq!(optimizer.status(), OptimizerStatus::Converged);
        let iterations = optimizer.states_tracker().iterations();
        assert_eq!(iterations, (0..iterations.len()).collect::<Vec<_>>());
        assert!(optimizer.states_tracker().convergence_reason().is_some());
        assert!(optimizer.fn_evals()["objective_count"] > 0);
    }

    #[test]
    // Purpose
    // -------
    // A one-iteration cap ends with `MaxIterations` and the matching status.
    fn iteration_cap_ends_with_max_iterations() {
        let data = regression_data();
        let objective = GlmObjective::squared(0.0).unwrap();
        let config = OptimizerConfig::tron().with_tolerances(Tolerances::new(None, None, 1).unwrap());
        let mut optimizer = Optimizer::new(config);

        optimizer.optimize(&objective, &data, None).unwrap();

        assert_eq!(optimizer.states_tracker().convergence_reason(), Some(ConvergenceReason::MaxIterations));
        assert_eq!(optimizer.status(), OptimizerStatus::MaxIterationsReached);
        assert_eq!(optimizer.current_state().unwrap().iteration(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Starting at the exact optimum (zero gradient) terminates at iteration 0
    // as `GradientConverged` without calling the step rule.
    fn zero_initial_gradient_terminates_immediately() {
        let data = regression_data();
        let objective = GlmObjective::squared(0.0).unwrap();
        let mut optimizer = Optimizer::new(OptimizerConfig::tron());

        let (w, _) = optimizer.optimize(&objective, &data, Some(array![0.5, -2.0])).unwrap();

        assert_eq!(w, array![0.5, -2.0]);
        assert_eq!(optimizer.states_tracker().iterations(), vec![0]);
        assert_eq!(
            optimizer.states_tracker().convergence_reason(),
            Some(ConvergenceReason::GradientConverged)
        );
        assert_eq!(optimizer.fn_evals()["hessian_vector_count"], 0);
    }

    #[test]
    // Purpose
    // -------
    // A non-finite initial objective ends the solve at iteration 0 with
    // `ObjectiveNotFinite`, an error, a `Failed` status, and a sealed tracker.
    fn non_finite_initial_objective_fails_the_solve() {
        let data = regression_data();
        let mut optimizer = Optimizer::new(OptimizerConfig::tron());

        let result = optimizer.optimize(&ExplodesAwayFromZero, &data, Some(array![1.0, 1.0]));

        assert!(matches!(result, Err(OptError::NonFiniteObjective { .. })));
        assert_eq!(optimizer.status(), OptimizerStatus::Failed);
        assert_eq!(optimizer.states_tracker().iterations(), vec![0]);
        assert_eq!(
            optimizer.states_tracker().convergence_reason(),
            Some(ConvergenceReason::ObjectiveNotFinite)
        );
    }

    #[test]
    // Purpose
    // -------
    // Constraint indices and starting-point dimensions are validated before
    // any objective evaluation.
    fn bad_constraints_and_dimensions_fail_before_evaluation() {
        let data = regression_data();
        let objective = GlmObjective::squared(0.0).unwrap();
        let constraints = ConstraintMap::new([(7, (0.0, 1.0))]).unwrap();
        let mut optimizer = Optimizer::new(OptimizerConfig::lbfgs().with_constraints(constraints));

        assert_eq!(
            optimizer.optimize(&objective, &data, None),
            Err(OptError::ConstraintIndexOutOfRange { index: 7, dim: 2 })
        );
        assert!(optimizer.fn_evals().is_empty());

        let mut plain = Optimizer::new(OptimizerConfig::lbfgs());
        assert_eq!(
            plain.optimize(&objective, &data, Some(array![0.0])),
            Err(OptError::CoefficientDimMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // With reuse enabled, the stored initial state survives a second solve
    // started from a different point.
    fn reused_initial_state_is_kept_across_solves() {
        let data = regression_data();
        let objective = GlmObjective::squared(0.0).unwrap();
        let config = OptimizerConfig::lbfgs().with_reuse_previous_initial_state(true);
        let mut optimizer = Optimizer::new(config);

        optimizer.optimize(&objective, &data, None).unwrap();
        let first_reference = optimizer.initial_state().cloned().unwrap();
        optimizer.optimize(&objective, &data, Some(array![0.4, -1.9])).unwrap();

        assert_eq!(optimizer.initial_state(), Some(&first_reference));
        assert_eq!(optimizer.states_tracker().iterations()[0], 0);

        optimizer.set_reuse_previous_initial_state(false);
        optimizer.optimize(&objective, &data, Some(array![0.4, -1.9])).unwrap();
        assert_eq!(optimizer.initial_state().unwrap().coefficients(), &array![0.4, -1.9]);
    }
}
